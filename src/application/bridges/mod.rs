//! # Bridge Strategies
//!
//! Port definition for transfer strategies.
//!
//! Every execution path (same-chain send, NFT transfer, cross-chain bridge,
//! DEX swap, registrar call) implements [`Bridge`]. A transfer attempt moves
//! through the stages below and may stop at any of them:
//!
//! ```text
//! can / available_for ──► calculate_fees ──► estimate_gas ──► build_tx | send
//! ```
//!
//! Provider quotes fetched along the way are stored on the caller's
//! [`TransferAttempt`], never on the bridge, so one bridge instance can serve
//! concurrent attempts.

pub mod cbridge;
pub mod ens;
pub mod erc721;
pub mod hop;
pub mod paraswap;
pub mod simple;
pub mod transfer;

pub use cbridge::CBridge;
pub use ens::{EnsDeployment, EnsRegisterBridge, EnsReleaseBridge};
pub use erc721::Erc721TransferBridge;
pub use hop::HopBridge;
pub use paraswap::SwapParaswap;
pub use simple::SimpleBridge;
pub use transfer::TransferBridge;

use crate::application::error::{BridgeError, BridgeResult};
use crate::application::transactor::{Submission, Transactor, TxSigner};
use crate::domain::{
    BonderFee, BridgeParams, CelerEstimate, Network, NetworkRegistry, PriceRoute, SendTxArgs,
    Token, TransactionBridge,
};
use crate::infrastructure::blockchain::{CallMsg, EthClient, GasEstimator};
use async_trait::async_trait;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, H256, U256};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Name of [`SimpleBridge`].
pub const SIMPLE_NAME: &str = "Simple";
/// Name of [`TransferBridge`].
pub const TRANSFER_NAME: &str = "Transfer";
/// Name of [`Erc721TransferBridge`].
pub const ERC721_TRANSFER_NAME: &str = "ERC721Transfer";
/// Name of [`HopBridge`].
pub const HOP_NAME: &str = "Hop";
/// Name of [`CBridge`].
pub const CBRIDGE_NAME: &str = "CBridge";
/// Name of [`SwapParaswap`].
pub const PARASWAP_NAME: &str = "Paraswap";
/// Name of [`EnsRegisterBridge`].
pub const ENS_REGISTER_NAME: &str = "ENSRegister";
/// Name of [`EnsReleaseBridge`].
pub const ENS_RELEASE_NAME: &str = "ENSRelease";

/// Fee pair returned by [`Bridge::calculate_fees`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeQuote {
    /// Protocol fee, e.g. the Hop bonder fee.
    pub base_fee: U256,
    /// Fee taken from the transferred token.
    pub token_fee: U256,
}

impl FeeQuote {
    /// No fee at all.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Sum of both components.
    #[must_use]
    pub fn total(&self) -> U256 {
        self.base_fee.saturating_add(self.token_fee)
    }
}

/// A provider quote obtained during one attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderQuote {
    /// Hop bonder fee quote.
    Hop(BonderFee),
    /// Celer fee estimate.
    Celer(CelerEstimate),
    /// Paraswap price route.
    Paraswap(PriceRoute),
}

/// One transfer attempt: the caller's intent plus whatever quote a bridge
/// fetched for it.
///
/// Create a fresh attempt per transfer and pass the same value through every
/// stage.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferAttempt {
    /// Transfer intent.
    pub params: BridgeParams,
    /// Quote stored by `calculate_fees` or `estimate_gas`.
    pub quote: Option<ProviderQuote>,
}

impl TransferAttempt {
    /// Starts an attempt with no quote.
    #[must_use]
    pub fn new(params: BridgeParams) -> Self {
        Self { params, quote: None }
    }

    /// Hop quote, if one was stored.
    #[must_use]
    pub fn hop_quote(&self) -> Option<&BonderFee> {
        match &self.quote {
            Some(ProviderQuote::Hop(quote)) => Some(quote),
            _ => None,
        }
    }

    /// Celer estimate, if one was stored.
    #[must_use]
    pub fn celer_estimate(&self) -> Option<&CelerEstimate> {
        match &self.quote {
            Some(ProviderQuote::Celer(estimate)) => Some(estimate),
            _ => None,
        }
    }

    /// Paraswap route, if one was stored.
    #[must_use]
    pub fn price_route(&self) -> Option<&PriceRoute> {
        match &self.quote {
            Some(ProviderQuote::Paraswap(route)) => Some(route),
            _ => None,
        }
    }

    /// Base send arguments for this intent: sender plus multi-transaction ID.
    #[must_use]
    pub fn base_args(&self, to: Address) -> SendTxArgs {
        let mut base = SendTxArgs::new(self.params.from_address, to);
        base.multi_transaction_id = self.params.multi_transaction_id;
        base
    }
}

/// Collaborators shared by every bridge.
#[derive(Debug, Clone)]
pub struct BridgeContext {
    transactor: Transactor,
    networks: NetworkRegistry,
}

impl BridgeContext {
    /// Creates a context.
    #[must_use]
    pub fn new(transactor: Transactor, networks: NetworkRegistry) -> Self {
        Self { transactor, networks }
    }

    /// Transaction builder and submitter.
    #[must_use]
    pub fn transactor(&self) -> &Transactor {
        &self.transactor
    }

    /// Gas safety margin.
    #[must_use]
    pub fn gas(&self) -> GasEstimator {
        self.transactor.gas()
    }

    /// Client for `chain_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedChain`] if no client is registered.
    pub fn client(&self, chain_id: u64) -> BridgeResult<Arc<dyn EthClient>> {
        self.transactor
            .clients()
            .get(chain_id)
            .map_err(|_| BridgeError::UnsupportedChain(chain_id))
    }

    /// Network descriptor for `chain_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedChain`] if the chain is unknown.
    pub fn network(&self, chain_id: u64) -> BridgeResult<&Network> {
        self.networks
            .find(chain_id)
            .ok_or(BridgeError::UnsupportedChain(chain_id))
    }

    /// Raw node estimate for fully packed arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain is unknown or the node rejects the call.
    pub async fn raw_estimate(&self, chain_id: u64, args: &SendTxArgs) -> BridgeResult<u64> {
        let client = self.client(chain_id)?;
        let msg = CallMsg {
            from: args.from,
            to: args.to,
            value: args.value.unwrap_or_default(),
            data: args.data.clone(),
        };
        Ok(client.estimate_gas(&msg).await?)
    }

    /// Node estimate for packed arguments with the safety margin applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain is unknown or the node rejects the call.
    pub async fn buffered_estimate(&self, chain_id: u64, args: &SendTxArgs) -> BridgeResult<u64> {
        let raw = self.raw_estimate(chain_id, args).await?;
        let gas = self.gas().apply_buffer(raw);
        debug!(chain_id, raw, gas, "gas estimated");
        Ok(gas)
    }
}

/// A transfer strategy.
///
/// Implementors supply eligibility, fee and gas logic plus [`prepare`] and
/// [`pack`]; building and sending go through the shared [`Transactor`].
///
/// [`prepare`]: Bridge::prepare
/// [`pack`]: Bridge::pack
#[async_trait]
pub trait Bridge: Send + Sync + fmt::Debug {
    /// Stable identifier used for selection and logging.
    fn name(&self) -> &'static str;

    /// Shared collaborators.
    fn context(&self) -> &BridgeContext;

    /// Cheap eligibility check.
    ///
    /// # Errors
    ///
    /// Returns an error only when eligibility itself cannot be decided, e.g.
    /// a token that cannot be resolved or a provider config that cannot be
    /// fetched.
    async fn can(
        &self,
        from: &Network,
        to: &Network,
        token: &Token,
        to_token: Option<&Token>,
        balance: U256,
    ) -> BridgeResult<bool>;

    /// Eligibility check for a full intent.
    ///
    /// # Errors
    ///
    /// Same as [`can`](Bridge::can).
    async fn available_for(&self, params: &BridgeParams) -> BridgeResult<bool> {
        self.can(
            &params.from_network,
            &params.to_network,
            &params.from_token,
            params.to_token.as_ref(),
            params.balance,
        )
        .await
    }

    /// Fees for the attempt. May fetch and store a provider quote.
    ///
    /// # Errors
    ///
    /// Returns an error if a quote cannot be fetched or parsed.
    async fn calculate_fees(&self, attempt: &mut TransferAttempt) -> BridgeResult<FeeQuote>;

    /// Gas limit for the attempt, safety margin included.
    ///
    /// # Errors
    ///
    /// Returns an error if packing or estimation fails.
    async fn estimate_gas(&self, attempt: &mut TransferAttempt) -> BridgeResult<u64>;

    /// Amount the recipient is expected to receive.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::QuoteMissing`] when the amount depends on a
    /// quote the attempt does not hold.
    async fn calculate_amount_out(&self, attempt: &TransferAttempt) -> BridgeResult<U256>;

    /// Contract the transfer is sent through on `network` for `token`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ContractNotFound`] when no deployment exists;
    /// never a zero address.
    async fn contract_address(&self, network: &Network, token: &Token) -> BridgeResult<Address>;

    /// Turns the attempt into this bridge's [`TransactionBridge`] payload.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidParams`] if the intent lacks a field
    /// this bridge needs.
    async fn prepare(&self, attempt: &TransferAttempt) -> BridgeResult<TransactionBridge>;

    /// Packs call data, target and value into the base send arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload belongs to another bridge or packing
    /// fails.
    async fn pack(&self, tx: &TransactionBridge) -> BridgeResult<SendTxArgs>;

    /// Unsigned transaction for a payload. The nonce is not advanced.
    ///
    /// # Errors
    ///
    /// Returns an error if packing or building fails.
    async fn build_transaction(&self, tx: TransactionBridge) -> BridgeResult<TypedTransaction> {
        let args = self.pack(&tx).await?;
        let built = self
            .context()
            .transactor()
            .send_or_build(tx.chain_id, &args, None)
            .await?;
        Ok(built.transaction().clone())
    }

    /// Unsigned transaction for an attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if preparing, packing or building fails.
    async fn build_tx(&self, attempt: &TransferAttempt) -> BridgeResult<TypedTransaction> {
        let tx = self.prepare(attempt).await?;
        self.build_transaction(tx).await
    }

    /// Packs, signs and submits a payload.
    ///
    /// # Errors
    ///
    /// Returns an error if packing, signing or submission fails. The nonce
    /// is rolled back on failure.
    async fn send(&self, tx: TransactionBridge, signer: &dyn TxSigner) -> BridgeResult<H256> {
        let args = self.pack(&tx).await?;
        submit(self.context(), tx.chain_id, &args, signer).await
    }
}

/// Sends packed arguments and returns the transaction hash.
///
/// # Errors
///
/// Returns any transactor error.
pub async fn submit(
    ctx: &BridgeContext,
    chain_id: u64,
    args: &SendTxArgs,
    signer: &dyn TxSigner,
) -> BridgeResult<H256> {
    match ctx.transactor().send_or_build(chain_id, args, Some(signer)).await? {
        Submission::Sent { hash, .. } => Ok(hash),
        Submission::Built(_) => Err(BridgeError::signer("transaction was built but not sent")),
    }
}

/// Error for a payload handed to the wrong bridge.
pub(crate) fn wrong_payload(bridge: &str, tx: &TransactionBridge) -> BridgeError {
    BridgeError::invalid_params(format!("{} cannot pack a {} payload", bridge, tx.args.kind()))
}
