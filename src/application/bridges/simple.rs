//! # Simple Bridge
//!
//! Same-chain send with fixed gas limits.

use super::{Bridge, BridgeContext, FeeQuote, SIMPLE_NAME, TransferAttempt, wrong_payload};
use crate::application::error::{BridgeError, BridgeResult};
use crate::domain::{Network, SendTxArgs, Token, TransactionBridge, TransferArgs};
use crate::infrastructure::blockchain::{ERC20_TRANSFER_GAS, NATIVE_TRANSFER_GAS};
use crate::infrastructure::contracts::abi::erc20_transfer;
use async_trait::async_trait;
use ethers::types::{Address, U256};
use std::sync::Arc;

/// Gas limit used for `token` when no estimate is taken.
#[must_use]
pub fn fixed_gas(token: &Token) -> u64 {
    if token.is_native() {
        NATIVE_TRANSFER_GAS
    } else {
        ERC20_TRANSFER_GAS
    }
}

/// Packed arguments for a same-chain send: value to the recipient for the
/// native asset, `transfer(recipient, amount)` to the token otherwise.
pub(crate) fn same_chain_args(attempt: &TransferAttempt) -> BridgeResult<SendTxArgs> {
    let params = &attempt.params;
    if params.from_token.is_native() {
        return Ok(attempt.base_args(params.to_address).with_value(params.amount_in));
    }
    let data = erc20_transfer(params.to_address, params.amount_in)?;
    Ok(attempt
        .base_args(params.from_token.contract_address())
        .with_value(U256::zero())
        .with_data(data))
}

/// Same-chain contract lookup: the token itself, none for the native asset.
pub(crate) fn token_contract(bridge: &str, network: &Network, token: &Token) -> BridgeResult<Address> {
    match token.address {
        Some(address) if !address.is_zero() => Ok(address),
        _ => Err(BridgeError::contract_not_found(bridge, &token.symbol, network.chain_id)),
    }
}

/// Same-chain transfer using [`NATIVE_TRANSFER_GAS`] or
/// [`ERC20_TRANSFER_GAS`].
#[derive(Debug, Clone)]
pub struct SimpleBridge {
    ctx: Arc<BridgeContext>,
}

impl SimpleBridge {
    /// Creates the bridge.
    #[must_use]
    pub fn new(ctx: Arc<BridgeContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Bridge for SimpleBridge {
    fn name(&self) -> &'static str {
        SIMPLE_NAME
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
        Ok(fixed_gas(&attempt.params.from_token))
    }

    async fn calculate_amount_out(&self, attempt: &TransferAttempt) -> BridgeResult<U256> {
        Ok(attempt.params.amount_in)
    }

    async fn contract_address(&self, network: &Network, token: &Token) -> BridgeResult<Address> {
        token_contract(SIMPLE_NAME, network, token)
    }

    async fn prepare(&self, attempt: &TransferAttempt) -> BridgeResult<TransactionBridge> {
        let args = same_chain_args(attempt)?.with_gas(fixed_gas(&attempt.params.from_token));
        Ok(TransactionBridge::new(
            attempt.params.from_network.chain_id,
            TransferArgs::Simple(args),
        ))
    }

    async fn pack(&self, tx: &TransactionBridge) -> BridgeResult<SendTxArgs> {
        match &tx.args {
            TransferArgs::Simple(args) => Ok(args.clone()),
            _ => Err(wrong_payload(SIMPLE_NAME, tx)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::bridges::fixtures;
    use crate::testing::MockEthClient;
    use ethers::signers::{LocalWallet, Signer};
    use proptest::prelude::*;

    fn bridge(client: Arc<MockEthClient>) -> SimpleBridge {
        SimpleBridge::new(Arc::new(fixtures::context(vec![client])))
    }

    fn network(chain_id: u64) -> Network {
        Network::new(chain_id, "test", false, 1)
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio_test::block_on(future)
    }

    proptest! {
        #[test]
        fn can_only_within_one_chain(from in 1u64..500_000, to in 1u64..500_000) {
            let bridge = bridge(Arc::new(MockEthClient::new(1)));
            let token = Token::native("ETH", from);
            let can = block_on(bridge.can(&network(from), &network(to), &token, None, U256::zero())).unwrap();
            prop_assert_eq!(can, from == to);
        }

        #[test]
        fn gas_is_fixed_by_token_kind(amount in 1u64..u64::MAX, native in any::<bool>()) {
            let bridge = bridge(Arc::new(MockEthClient::new(1)));
            let token = if native { Token::native("ETH", 1) } else { fixtures::usdc(1) };
            let mut attempt = TransferAttempt::new(
                fixtures::params(Network::ethereum(), Network::ethereum(), token, amount),
            );
            let gas = block_on(bridge.estimate_gas(&mut attempt)).unwrap();
            prop_assert_eq!(gas, if native { 22_000 } else { 200_000 });
        }
    }

    #[tokio::test]
    async fn erc20_send_targets_token_contract() {
        let client = Arc::new(MockEthClient::new(1));
        let bridge = bridge(client.clone());
        let attempt = TransferAttempt::new(fixtures::params(
            Network::ethereum(),
            Network::ethereum(),
            fixtures::usdc(1),
            1_000,
        ));

        let tx = bridge.build_tx(&attempt).await.unwrap();
        assert_eq!(tx.to_addr().copied(), Some(fixtures::USDC_MAINNET.parse().unwrap()));
        assert_eq!(tx.gas(), Some(&U256::from(200_000u64)));
        assert!(tx.value().unwrap().is_zero());
        assert_eq!(tx.data().unwrap().get(..4).unwrap(), &[0xa9, 0x05, 0x9c, 0xbb]);
        assert!(client.last_estimate().is_none());
    }

    #[tokio::test]
    async fn native_send_is_signed_and_submitted() {
        let wallet = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
            .parse::<LocalWallet>()
            .unwrap()
            .with_chain_id(1u64);
        let client = Arc::new(MockEthClient::new(1));
        let bridge = bridge(client.clone());
        let mut params = fixtures::params(Network::ethereum(), Network::ethereum(), Token::native("ETH", 1), 5);
        params.from_address = Signer::address(&wallet);

        let tx = bridge.prepare(&TransferAttempt::new(params)).await.unwrap();
        assert_eq!(tx.value(), U256::from(5u64));
        assert_eq!(tx.to(), Some(fixtures::recipient()));

        bridge.send(tx, &wallet).await.unwrap();
        assert_eq!(client.sent_count(), 1);
    }

    #[tokio::test]
    async fn native_asset_has_no_contract() {
        let bridge = bridge(Arc::new(MockEthClient::new(1)));
        let err = bridge
            .contract_address(&Network::ethereum(), &Token::native("ETH", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::ContractNotFound { .. }));
    }
}
