//! # Paraswap Swap
//!
//! Same-chain token swap through the Paraswap aggregator.
//!
//! One price-route fetch yields both the gas cost and the route; the route
//! is stored on the attempt and posted back when the transaction is built.
//! The transaction returned by Paraswap is authoritative for target, value,
//! gas and gas price.

use super::{
    Bridge, BridgeContext, FeeQuote, PARASWAP_NAME, ProviderQuote, TransferAttempt, submit,
    wrong_payload,
};
use crate::application::error::{BridgeError, BridgeResult};
use crate::application::transactor::TxSigner;
use crate::domain::network::{ARBITRUM_MAINNET, ETHEREUM_MAINNET, OPTIMISM_MAINNET};
use crate::domain::{Network, PriceRoute, SendTxArgs, SwapTxArgs, Token, TransactionBridge, TransferArgs};
use crate::infrastructure::quotes::{ParaswapClient, SwapRequest};
use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use std::sync::Arc;
use tracing::debug;

/// Paraswap TokenTransferProxy, the spender to approve.
pub const TOKEN_TRANSFER_PROXY: &str = "0x216b4b4ba9f3e719726886d34a177484278bfcae";

/// Paraswap swap strategy.
#[derive(Debug, Clone)]
pub struct SwapParaswap {
    ctx: Arc<BridgeContext>,
    client: Arc<ParaswapClient>,
}

impl SwapParaswap {
    /// Creates the strategy.
    #[must_use]
    pub fn new(ctx: Arc<BridgeContext>, client: Arc<ParaswapClient>) -> Self {
        Self { ctx, client }
    }

    /// Fills a missing token address from the Paraswap token list.
    async fn resolve(&self, chain_id: u64, token: &Token) -> BridgeResult<Token> {
        if token.address.is_some() {
            return Ok(token.clone());
        }
        let listed = self
            .client
            .find_token(chain_id, &token.symbol)
            .await?
            .ok_or_else(|| BridgeError::token_not_resolved(&token.symbol, chain_id))?;
        debug!(chain_id, symbol = %token.symbol, address = ?listed.address, "token resolved");
        Ok(token.clone().with_address(listed.address).with_decimals(listed.decimals))
    }

    async fn resolve_pair(&self, attempt: &TransferAttempt) -> BridgeResult<(Token, Token)> {
        let params = &attempt.params;
        let chain_id = params.from_network.chain_id;
        let to_token = params
            .to_token
            .as_ref()
            .ok_or_else(|| BridgeError::invalid_params("swap needs a destination token"))?;
        let from = self.resolve(chain_id, &params.from_token).await?;
        let to = self.resolve(chain_id, to_token).await?;
        Ok((from, to))
    }

    /// Route held by the attempt, fetched if absent.
    async fn route(&self, attempt: &mut TransferAttempt) -> BridgeResult<PriceRoute> {
        if let Some(route) = attempt.price_route() {
            return Ok(route.clone());
        }
        let (from, to) = self.resolve_pair(attempt).await?;
        let route = self
            .client
            .price_route(attempt.params.from_network.chain_id, &from, &to, attempt.params.amount_in)
            .await?;
        attempt.quote = Some(ProviderQuote::Paraswap(route.clone()));
        Ok(route)
    }
}

#[async_trait]
impl Bridge for SwapParaswap {
    fn name(&self) -> &'static str {
        PARASWAP_NAME
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
        let Some(to_token) = to_token else {
            return Ok(false);
        };
        if from.chain_id != to.chain_id {
            return Ok(false);
        }
        self.resolve(from.chain_id, token).await?;
        self.resolve(from.chain_id, to_token).await?;
        Ok(true)
    }

    async fn calculate_fees(&self, attempt: &mut TransferAttempt) -> BridgeResult<FeeQuote> {
        self.route(attempt).await?;
        Ok(FeeQuote::zero())
    }

    async fn estimate_gas(&self, attempt: &mut TransferAttempt) -> BridgeResult<u64> {
        Ok(self.route(attempt).await?.gas_cost())
    }

    async fn calculate_amount_out(&self, attempt: &TransferAttempt) -> BridgeResult<U256> {
        attempt
            .price_route()
            .map(PriceRoute::dest_amount)
            .ok_or_else(|| BridgeError::QuoteMissing(PARASWAP_NAME.to_string()))
    }

    async fn contract_address(&self, network: &Network, token: &Token) -> BridgeResult<Address> {
        match network.chain_id {
            ETHEREUM_MAINNET | OPTIMISM_MAINNET | ARBITRUM_MAINNET => TOKEN_TRANSFER_PROXY
                .parse()
                .map_err(|_| BridgeError::contract_not_found(PARASWAP_NAME, &token.symbol, network.chain_id)),
            chain_id => Err(BridgeError::contract_not_found(PARASWAP_NAME, &token.symbol, chain_id)),
        }
    }

    async fn prepare(&self, attempt: &TransferAttempt) -> BridgeResult<TransactionBridge> {
        let route = attempt
            .price_route()
            .cloned()
            .ok_or_else(|| BridgeError::QuoteMissing(PARASWAP_NAME.to_string()))?;
        let (from_token, to_token) = self.resolve_pair(attempt).await?;
        let proxy = self.contract_address(&attempt.params.from_network, &from_token).await?;
        Ok(TransactionBridge::new(
            attempt.params.from_network.chain_id,
            TransferArgs::Swap(SwapTxArgs {
                base: attempt.base_args(proxy),
                from_token,
                to_token,
                amount_in: attempt.params.amount_in,
                recipient: attempt.params.to_address,
                price_route: Some(route),
            }),
        ))
    }

    async fn pack(&self, tx: &TransactionBridge) -> BridgeResult<SendTxArgs> {
        let TransferArgs::Swap(args) = &tx.args else {
            return Err(wrong_payload(PARASWAP_NAME, tx));
        };
        let route = args
            .price_route
            .as_ref()
            .ok_or_else(|| BridgeError::QuoteMissing(PARASWAP_NAME.to_string()))?;
        let request = SwapRequest {
            src_token: args.from_token.contract_address(),
            src_decimals: args.from_token.decimals,
            dest_token: args.to_token.contract_address(),
            dest_decimals: args.to_token.decimals,
            src_amount: args.amount_in.to_string(),
            dest_amount: Some(route.dest_amount().to_string()),
            price_route: route,
            user_address: args.base.from,
            receiver: args.recipient,
            slippage: None,
            partner: self.client.partner(),
        };
        let swap = self.client.build_transaction(tx.chain_id, &request).await?;

        let mut base = args.base.clone();
        base.to = Some(swap.to);
        base.value = Some(swap.value);
        base.data = swap.data;
        base.gas = swap.gas.or(base.gas);
        base.gas_price = swap.gas_price.or(base.gas_price);
        Ok(base)
    }

    async fn send(&self, tx: TransactionBridge, signer: &dyn TxSigner) -> BridgeResult<H256> {
        let chain_id = tx.chain_id;
        let args = match tx.args {
            TransferArgs::Swap(args) => args,
            other => {
                return Err(BridgeError::invalid_params(format!(
                    "{} cannot send a {} payload",
                    PARASWAP_NAME,
                    other.kind()
                )));
            }
        };
        let base = SendTxArgs {
            from: args.base.from,
            to: args.base.to,
            multi_transaction_id: args.base.multi_transaction_id,
            ..Default::default()
        };
        let fresh = TransactionBridge::new(chain_id, TransferArgs::Swap(SwapTxArgs { base, ..args }));
        let packed = self.pack(&fresh).await?;
        submit(&self.ctx, chain_id, &packed, signer).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::bridges::fixtures;
    use crate::infrastructure::quotes::HttpClient;
    use crate::testing::MockEthClient;
    use ethers::signers::{LocalWallet, Signer};
    use ethers::types::{Bytes, Transaction};
    use ethers::utils::rlp;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DAI: &str = "0x6b175474e89094c44da98b954eedeac495271d0f";
    const AUGUSTUS: &str = "0xdef171fe48cf0115b1d80b88dc8eab59176fee57";

    fn route_json() -> serde_json::Value {
        json!({
            "srcToken": fixtures::USDC_MAINNET,
            "srcAmount": "1000000",
            "destToken": DAI,
            "destAmount": "999000000000000000",
            "gasCost": "180000",
            "tokenTransferProxy": TOKEN_TRANSFER_PROXY
        })
    }

    async fn paraswap() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tokens/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tokens": [{"symbol": "DAI", "address": DAI, "decimals": 18}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/prices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"priceRoute": route_json()})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/transactions/1"))
            .and(body_partial_json(json!({
                "destAmount": "999000000000000000",
                "priceRoute": route_json(),
                "receiver": format!("{:?}", fixtures::recipient())
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "from": "0x1111111111111111111111111111111111111111",
                "to": AUGUSTUS,
                "value": "0",
                "data": "0xdeadbeef",
                "gasPrice": "30000000000",
                "gas": "210000"
            })))
            .mount(&server)
            .await;
        server
    }

    fn swap(server: &MockServer, client: Arc<MockEthClient>) -> SwapParaswap {
        SwapParaswap::new(
            Arc::new(fixtures::context(vec![client])),
            Arc::new(ParaswapClient::new(HttpClient::new(5000).unwrap(), server.uri(), None)),
        )
    }

    fn params() -> crate::domain::BridgeParams {
        fixtures::params(Network::ethereum(), Network::ethereum(), fixtures::usdc(1), 1_000_000)
            .with_to_token(Token::unresolved("DAI", 1, 18))
    }

    #[tokio::test]
    async fn can_resolves_tokens_from_list() {
        let server = paraswap().await;
        let bridge = swap(&server, Arc::new(MockEthClient::new(1)));
        assert!(bridge.available_for(&params()).await.unwrap());

        let missing = params().with_to_token(Token::unresolved("NOPE", 1, 18));
        let err = bridge.available_for(&missing).await.unwrap_err();
        assert!(matches!(err, BridgeError::TokenNotResolved { .. }));

        let plain = fixtures::params(Network::ethereum(), Network::ethereum(), fixtures::usdc(1), 1);
        assert!(!bridge.available_for(&plain).await.unwrap());
    }

    #[tokio::test]
    async fn one_route_serves_fees_gas_and_build() {
        let server = paraswap().await;
        let client = Arc::new(MockEthClient::new(1));
        let bridge = swap(&server, client.clone());
        let mut attempt = TransferAttempt::new(params());

        assert!(bridge.calculate_fees(&mut attempt).await.unwrap().total().is_zero());
        assert_eq!(bridge.estimate_gas(&mut attempt).await.unwrap(), 180_000);
        assert_eq!(
            bridge.calculate_amount_out(&attempt).await.unwrap(),
            U256::from_dec_str("999000000000000000").unwrap()
        );

        let tx = bridge.build_tx(&attempt).await.unwrap();
        assert_eq!(tx.to_addr().copied(), Some(AUGUSTUS.parse().unwrap()));
        assert_eq!(tx.gas(), Some(&U256::from(210_000u64)));
        assert_eq!(tx.gas_price(), Some(U256::from(30_000_000_000u64)));
        assert!(client.last_estimate().is_none());

        let requests = server.received_requests().await.unwrap();
        let route_fetches = requests.iter().filter(|r| r.url.path() == "/prices").count();
        assert_eq!(route_fetches, 1);
    }

    #[tokio::test]
    async fn build_without_route_is_refused() {
        let server = MockServer::start().await;
        let bridge = swap(&server, Arc::new(MockEthClient::new(1)));
        let err = bridge.build_tx(&TransferAttempt::new(params())).await.unwrap_err();
        assert!(matches!(err, BridgeError::QuoteMissing(_)));
    }

    #[tokio::test]
    async fn send_discards_stale_gas_and_value() {
        let server = paraswap().await;
        let wallet = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
            .parse::<LocalWallet>()
            .unwrap()
            .with_chain_id(1u64);
        let client = Arc::new(MockEthClient::new(1));
        let bridge = swap(&server, client.clone());
        let mut params = params();
        params.from_address = Signer::address(&wallet);
        let mut attempt = TransferAttempt::new(params);
        bridge.estimate_gas(&mut attempt).await.unwrap();

        let mut tx = bridge.prepare(&attempt).await.unwrap();
        let base = tx.args.base_mut();
        base.value = Some(U256::from(123u64));
        base.gas = Some(1);

        bridge.send(tx, &wallet).await.unwrap();
        assert_eq!(client.sent_count(), 1);

        let raw = client.raw_transactions.lock().unwrap()[0].clone();
        let sent: Transaction = rlp::decode(&raw).unwrap();
        assert_eq!(sent.from, Signer::address(&wallet));
        assert_eq!(sent.to, Some(AUGUSTUS.parse().unwrap()));
        assert_eq!(sent.gas, U256::from(210_000u64));
        assert_eq!(sent.gas_price, Some(U256::from(30_000_000_000u64)));
        assert!(sent.value.is_zero());
        assert_eq!(sent.input, Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]));
    }

    #[tokio::test]
    async fn bought_tokens_go_to_the_recipient() {
        let server = paraswap().await;
        let bridge = swap(&server, Arc::new(MockEthClient::new(1)));
        let mut attempt = TransferAttempt::new(params());
        bridge.estimate_gas(&mut attempt).await.unwrap();
        bridge.build_tx(&attempt).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let build = requests.iter().find(|r| r.url.path() == "/transactions/1").unwrap();
        let body: serde_json::Value = serde_json::from_slice(&build.body).unwrap();
        assert_eq!(body["receiver"], json!(format!("{:?}", fixtures::recipient())));
        assert_eq!(body["userAddress"], json!(format!("{:?}", fixtures::sender())));
    }

    #[tokio::test]
    async fn proxy_only_on_known_chains() {
        let server = MockServer::start().await;
        let bridge = swap(&server, Arc::new(MockEthClient::new(1)));
        let proxy = bridge.contract_address(&Network::arbitrum(), &fixtures::usdc(42_161)).await.unwrap();
        assert_eq!(proxy, TOKEN_TRANSFER_PROXY.parse().unwrap());
        assert!(bridge.contract_address(&Network::sepolia(), &fixtures::usdc(11_155_111)).await.is_err());
    }
}
