//! # ERC-721 Transfer Bridge
//!
//! Same-chain NFT transfer. The transaction target is the collection
//! contract itself; the call is `safeTransferFrom(from, recipient, id)`.

use super::simple::token_contract;
use super::{Bridge, BridgeContext, ERC721_TRANSFER_NAME, FeeQuote, TransferAttempt, wrong_payload};
use crate::application::error::{BridgeError, BridgeResult};
use crate::domain::{Erc721TxArgs, Network, SendTxArgs, Token, TransactionBridge, TransferArgs};
use crate::infrastructure::contracts::abi::erc721_safe_transfer_from;
use async_trait::async_trait;
use ethers::types::{Address, U256};
use std::sync::Arc;

/// NFT transfer bridge.
#[derive(Debug, Clone)]
pub struct Erc721TransferBridge {
    ctx: Arc<BridgeContext>,
}

impl Erc721TransferBridge {
    /// Creates the bridge.
    #[must_use]
    pub fn new(ctx: Arc<BridgeContext>) -> Self {
        Self { ctx }
    }

    fn packed(args: &Erc721TxArgs) -> BridgeResult<SendTxArgs> {
        let mut base = args.base.clone();
        base.data = erc721_safe_transfer_from(base.from, args.recipient, args.token_id)?;
        base.value = Some(U256::zero());
        Ok(base)
    }
}

#[async_trait]
impl Bridge for Erc721TransferBridge {
    fn name(&self) -> &'static str {
        ERC721_TRANSFER_NAME
    }

    fn context(&self) -> &BridgeContext {
        &self.ctx
    }

    async fn can(
        &self,
        from: &Network,
        to: &Network,
        _token: &Token,
        _to_token: Option<&Token>,
        _balance: U256,
    ) -> BridgeResult<bool> {
        Ok(from.chain_id == to.chain_id)
    }

    async fn calculate_fees(&self, _attempt: &mut TransferAttempt) -> BridgeResult<FeeQuote> {
        Ok(FeeQuote::zero())
    }

    async fn estimate_gas(&self, attempt: &mut TransferAttempt) -> BridgeResult<u64> {
        let tx = self.prepare(attempt).await?;
        let args = self.pack(&tx).await?;
        self.ctx.buffered_estimate(tx.chain_id, &args).await
    }

    async fn calculate_amount_out(&self, attempt: &TransferAttempt) -> BridgeResult<U256> {
        Ok(attempt.params.amount_in)
    }

    async fn contract_address(&self, network: &Network, token: &Token) -> BridgeResult<Address> {
        token_contract(ERC721_TRANSFER_NAME, network, token)
    }

    async fn prepare(&self, attempt: &TransferAttempt) -> BridgeResult<TransactionBridge> {
        let params = &attempt.params;
        let token_id = params
            .collectible_id
            .ok_or_else(|| BridgeError::invalid_params("collectible id is required"))?;
        let collection = token_contract(ERC721_TRANSFER_NAME, &params.from_network, &params.from_token)?;
        Ok(TransactionBridge::new(
            params.from_network.chain_id,
            TransferArgs::Erc721(Erc721TxArgs {
                base: attempt.base_args(collection),
                token_id,
                recipient: params.to_address,
            }),
        ))
    }

    async fn pack(&self, tx: &TransactionBridge) -> BridgeResult<SendTxArgs> {
        match &tx.args {
            TransferArgs::Erc721(args) => Self::packed(args),
            _ => Err(wrong_payload(ERC721_TRANSFER_NAME, tx)),
        }
    }
}
