//! # Celer cBridge
//!
//! Cross-chain transfer through Celer's liquidity pools. Supported chains,
//! tokens and pool contracts come from the gateway transfer configuration;
//! the production or test gateway is picked by the source network.

use super::{Bridge, BridgeContext, CBRIDGE_NAME, FeeQuote, ProviderQuote, TransferAttempt, wrong_payload};
use crate::application::error::{BridgeError, BridgeResult};
use crate::domain::{CbridgeTxArgs, Network, SendTxArgs, Token, TransactionBridge, TransferArgs};
use crate::infrastructure::blockchain::ERC20_BRIDGE_GAS_FALLBACK;
use crate::infrastructure::contracts::abi::CelerSend;
use crate::infrastructure::quotes::{CelerClient, QuoteError};
use async_trait::async_trait;
use chrono::Utc;
use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::warn;

/// Max slippage packed into `send`/`sendNative`, in basis points.
pub const MAX_SLIPPAGE_BPS: u32 = 500;

/// Celer cBridge.
#[derive(Debug, Clone)]
pub struct CBridge {
    ctx: Arc<BridgeContext>,
    client: Arc<CelerClient>,
}

impl CBridge {
    /// Creates the bridge.
    #[must_use]
    pub fn new(ctx: Arc<BridgeContext>, client: Arc<CelerClient>) -> Self {
        Self { ctx, client }
    }

    async fn pool(&self, network: &Network, token: &Token) -> BridgeResult<Address> {
        let config = self.client.transfer_config(network.is_test).await?;
        config
            .contract_address(network.chain_id)
            .ok_or_else(|| BridgeError::contract_not_found(CBRIDGE_NAME, &token.symbol, network.chain_id))
    }

    async fn encode(&self, tx: &TransactionBridge) -> BridgeResult<(SendTxArgs, Token)> {
        let TransferArgs::Cbridge(args) = &tx.args else {
            return Err(wrong_payload(CBRIDGE_NAME, tx));
        };
        let network = self.ctx.network(tx.chain_id)?;
        let pool = self.pool(network, &args.token).await?;
        let native = args.token.is_native();
        let send = CelerSend {
            receiver: args.recipient,
            token: (!native).then(|| args.token.contract_address()),
            amount: args.amount,
            dst_chain_id: args.chain_id,
            nonce: u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default(),
            max_slippage: MAX_SLIPPAGE_BPS,
        };

        let mut base = args.base.clone();
        base.to = Some(pool);
        base.data = send.encode()?;
        base.value = Some(if native { args.amount } else { U256::zero() });
        Ok((base, args.token.clone()))
    }

    async fn gas_for(&self, chain_id: u64, args: &SendTxArgs, token: &Token) -> BridgeResult<u64> {
        let raw = match self.ctx.raw_estimate(chain_id, args).await {
            Ok(raw) => raw,
            Err(e) if !token.is_native() => {
                warn!(chain_id, token = %token.symbol, error = %e, "cbridge estimate failed, using fallback");
                ERC20_BRIDGE_GAS_FALLBACK
            }
            Err(e) => return Err(e),
        };
        Ok(self.ctx.gas().apply_buffer(raw))
    }
}

#[async_trait]
impl Bridge for CBridge {
    fn name(&self) -> &'static str {
        CBRIDGE_NAME
    }

    fn context(&self) -> &BridgeContext {
        &self.ctx
    }

    async fn can(
        &self,
        from: &Network,
        to: &Network,
        token: &Token,
        to_token: Option<&Token>,
        _balance: U256,
    ) -> BridgeResult<bool> {
        if from.chain_id == to.chain_id || to_token.is_some() {
            return Ok(false);
        }
        let config = self.client.transfer_config(from.is_test).await?;
        Ok(config.supports_token(from.chain_id, &token.symbol)
            && config.supports_token(to.chain_id, &token.symbol))
    }

    async fn calculate_fees(&self, attempt: &mut TransferAttempt) -> BridgeResult<FeeQuote> {
        let params = &attempt.params;
        let estimate = self
            .client
            .estimate_amt(
                params.from_network.chain_id,
                params.to_network.chain_id,
                &params.from_token.symbol,
                params.amount_in,
                params.from_network.is_test,
            )
            .await?;
        let token_fee = estimate.total_fee().map_err(QuoteError::from)?;
        attempt.quote = Some(ProviderQuote::Celer(estimate));
        Ok(FeeQuote {
            base_fee: U256::zero(),
            token_fee,
        })
    }

    async fn estimate_gas(&self, attempt: &mut TransferAttempt) -> BridgeResult<u64> {
        let tx = self.prepare(attempt).await?;
        let (args, token) = self.encode(&tx).await?;
        self.gas_for(tx.chain_id, &args, &token).await
    }

    async fn calculate_amount_out(&self, attempt: &TransferAttempt) -> BridgeResult<U256> {
        let estimate = attempt
            .celer_estimate()
            .ok_or_else(|| BridgeError::QuoteMissing(CBRIDGE_NAME.to_string()))?;
        Ok(estimate.amount_out().map_err(QuoteError::from)?)
    }

    async fn contract_address(&self, network: &Network, token: &Token) -> BridgeResult<Address> {
        self.pool(network, token).await
    }

    async fn prepare(&self, attempt: &TransferAttempt) -> BridgeResult<TransactionBridge> {
        let params = &attempt.params;
        let pool = self.pool(&params.from_network, &params.from_token).await?;
        Ok(TransactionBridge::new(
            params.from_network.chain_id,
            TransferArgs::Cbridge(CbridgeTxArgs {
                base: attempt.base_args(pool),
                chain_id: params.to_network.chain_id,
                token: params.from_token.clone(),
                recipient: params.to_address,
                amount: params.amount_in,
            }),
        ))
    }

    async fn pack(&self, tx: &TransactionBridge) -> BridgeResult<SendTxArgs> {
        let (mut args, token) = self.encode(tx).await?;
        if args.gas.is_none() {
            args.gas = Some(self.gas_for(tx.chain_id, &args, &token).await?);
        }
        Ok(args)
    }
}
