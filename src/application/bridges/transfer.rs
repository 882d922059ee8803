//! # Transfer Bridge
//!
//! Same-chain send packed like [`SimpleBridge`](super::SimpleBridge) but
//! with a dynamic gas estimate.

use super::simple::{same_chain_args, token_contract};
use super::{Bridge, BridgeContext, FeeQuote, TRANSFER_NAME, TransferAttempt, wrong_payload};
use crate::application::error::BridgeResult;
use crate::domain::{Network, SendTxArgs, Token, TransactionBridge, TransferArgs};
use async_trait::async_trait;
use ethers::types::{Address, U256};
use std::sync::Arc;

/// Same-chain transfer whose gas is `eth_estimateGas` plus the safety margin.
#[derive(Debug, Clone)]
pub struct TransferBridge {
    ctx: Arc<BridgeContext>,
}

impl TransferBridge {
    /// Creates the bridge.
    #[must_use]
    pub fn new(ctx: Arc<BridgeContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Bridge for TransferBridge {
    fn name(&self) -> &'static str {
        TRANSFER_NAME
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
        let args = same_chain_args(attempt)?;
        self.ctx
            .buffered_estimate(attempt.params.from_network.chain_id, &args)
            .await
    }

    async fn calculate_amount_out(&self, attempt: &TransferAttempt) -> BridgeResult<U256> {
        Ok(attempt.params.amount_in)
    }

    async fn contract_address(&self, network: &Network, token: &Token) -> BridgeResult<Address> {
        token_contract(TRANSFER_NAME, network, token)
    }

    async fn prepare(&self, attempt: &TransferAttempt) -> BridgeResult<TransactionBridge> {
        Ok(TransactionBridge::new(
            attempt.params.from_network.chain_id,
            TransferArgs::Transfer(same_chain_args(attempt)?),
        ))
    }

    async fn pack(&self, tx: &TransactionBridge) -> BridgeResult<SendTxArgs> {
        match &tx.args {
            TransferArgs::Transfer(args) => Ok(args.clone()),
            _ => Err(wrong_payload(TRANSFER_NAME, tx)),
        }
    }
}
