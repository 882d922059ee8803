//! # Hop Bridge
//!
//! Cross-chain transfer through the Hop protocol.
//!
//! The contract and its ABI follow from the deployment table: the source
//! chain and token symbol give a contract role, and the role, chain family
//! and token kind select one of the send encodings (see
//! [`ABI_ROUTES`](crate::infrastructure::contracts::hop::ABI_ROUTES)).
//! Fees come from the Hop quote API; the quote is kept on the attempt and
//! reused when the transaction is packed.

use super::{Bridge, BridgeContext, FeeQuote, HOP_NAME, ProviderQuote, TransferAttempt, wrong_payload};
use crate::application::error::{BridgeError, BridgeResult};
use crate::domain::{HopTxArgs, Network, SendTxArgs, Token, TransactionBridge, TransferArgs};
use crate::infrastructure::blockchain::ERC20_BRIDGE_GAS_FALLBACK;
use crate::infrastructure::contracts::hop::{self as hop_contracts, HopSendValues};
use crate::infrastructure::quotes::HopClient;
use crate::infrastructure::quotes::hop::chain_name;
use async_trait::async_trait;
use chrono::Utc;
use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::{debug, warn};

/// Hop protocol bridge.
#[derive(Debug, Clone)]
pub struct HopBridge {
    ctx: Arc<BridgeContext>,
    client: Arc<HopClient>,
}

impl HopBridge {
    /// Creates the bridge.
    #[must_use]
    pub fn new(ctx: Arc<BridgeContext>, client: Arc<HopClient>) -> Self {
        Self { ctx, client }
    }

    fn deployment(chain_id: u64, token: &Token) -> BridgeResult<(Address, hop_contracts::HopContractRole)> {
        hop_contracts::contract_address(chain_id, &token.symbol)
            .ok_or_else(|| BridgeError::contract_not_found(HOP_NAME, &token.symbol, chain_id))
    }

    /// Packs call data, target and value; gas is left as set on the payload.
    fn encode<'a>(&self, tx: &'a TransactionBridge) -> BridgeResult<(SendTxArgs, &'a HopTxArgs)> {
        let TransferArgs::Hop(args) = &tx.args else {
            return Err(wrong_payload(HOP_NAME, tx));
        };
        let (contract, role) = Self::deployment(tx.chain_id, &args.token)?;
        let abi = hop_contracts::select_abi(role, tx.chain_id, &args.token)?;
        let values = match &args.quote {
            Some(quote) => HopSendValues::from_quote(quote),
            None => {
                let to_l1 = self.ctx.network(args.chain_id)?.is_l1();
                HopSendValues::without_quote(args.amount, args.bonder_fee, Utc::now().timestamp(), to_l1)
            }
        };
        debug!(chain_id = tx.chain_id, ?abi, %role, to_chain_id = args.chain_id, "packing hop send");

        let mut base = args.base.clone();
        base.to = Some(contract);
        base.data = hop_contracts::encode_send(abi, args.chain_id, args.recipient, &values)?;
        base.value = Some(if args.token.is_native() {
            values.amount_in
        } else {
            U256::zero()
        });
        Ok((base, args))
    }

    /// Buffered estimate for packed arguments.
    ///
    /// Requires code at the target. An ERC20 estimate that fails, typically
    /// because no allowance is set yet, falls back to
    /// [`ERC20_BRIDGE_GAS_FALLBACK`].
    async fn gas_for(&self, chain_id: u64, args: &SendTxArgs, token: &Token) -> BridgeResult<u64> {
        let client = self.ctx.client(chain_id)?;
        let contract = args.to.unwrap_or_default();
        if client.pending_code_at(contract).await?.is_empty() {
            return Err(BridgeError::NoCode {
                chain_id,
                address: contract,
            });
        }
        let raw = match self.ctx.raw_estimate(chain_id, args).await {
            Ok(raw) => raw,
            Err(e) if !token.is_native() => {
                warn!(chain_id, token = %token.symbol, error = %e, "hop estimate failed, using fallback");
                ERC20_BRIDGE_GAS_FALLBACK
            }
            Err(e) => return Err(e),
        };
        Ok(self.ctx.gas().apply_buffer(raw))
    }
}

#[async_trait]
impl Bridge for HopBridge {
    fn name(&self) -> &'static str {
        HOP_NAME
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
        Ok(hop_contracts::contract_address(from.chain_id, &token.symbol).is_some())
    }

    async fn calculate_fees(&self, attempt: &mut TransferAttempt) -> BridgeResult<FeeQuote> {
        let params = &attempt.params;
        let from_chain = chain_name(params.from_network.chain_id)
            .ok_or(BridgeError::UnsupportedChain(params.from_network.chain_id))?;
        let to_chain = chain_name(params.to_network.chain_id)
            .ok_or(BridgeError::UnsupportedChain(params.to_network.chain_id))?;
        let quote = self
            .client
            .quote(params.amount_in, &params.from_token.symbol, from_chain, to_chain)
            .await?;
        let fees = FeeQuote {
            base_fee: quote.bonder_fee,
            token_fee: U256::zero(),
        };
        attempt.quote = Some(ProviderQuote::Hop(quote));
        Ok(fees)
    }

    async fn estimate_gas(&self, attempt: &mut TransferAttempt) -> BridgeResult<u64> {
        let tx = self.prepare(attempt).await?;
        let (args, hop) = self.encode(&tx)?;
        self.gas_for(tx.chain_id, &args, &hop.token).await
    }

    async fn calculate_amount_out(&self, attempt: &TransferAttempt) -> BridgeResult<U256> {
        attempt
            .hop_quote()
            .map(|quote| quote.estimated_received)
            .ok_or_else(|| BridgeError::QuoteMissing(HOP_NAME.to_string()))
    }

    async fn contract_address(&self, network: &Network, token: &Token) -> BridgeResult<Address> {
        Self::deployment(network.chain_id, token).map(|(address, _)| address)
    }

    async fn prepare(&self, attempt: &TransferAttempt) -> BridgeResult<TransactionBridge> {
        let params = &attempt.params;
        let (contract, _) = Self::deployment(params.from_network.chain_id, &params.from_token)?;
        let quote = attempt.hop_quote().cloned();
        Ok(TransactionBridge::new(
            params.from_network.chain_id,
            TransferArgs::Hop(HopTxArgs {
                base: attempt.base_args(contract),
                chain_id: params.to_network.chain_id,
                token: params.from_token.clone(),
                recipient: params.to_address,
                amount: params.amount_in,
                bonder_fee: quote.as_ref().map(|q| q.bonder_fee).unwrap_or_default(),
                quote,
            }),
        ))
    }

    async fn pack(&self, tx: &TransactionBridge) -> BridgeResult<SendTxArgs> {
        let (mut args, hop) = self.encode(tx)?;
        if args.gas.is_none() {
            args.gas = Some(self.gas_for(tx.chain_id, &args, &hop.token).await?);
        }
        Ok(args)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::bridges::fixtures;
    use crate::infrastructure::contracts::decode_call;
    use crate::infrastructure::contracts::hop::{HopAbi, decode_send};
    use ethers::abi::Token as AbiToken;
    use crate::infrastructure::quotes::HttpClient;
    use crate::testing::MockEthClient;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn bridge(server_uri: &str, client: Arc<MockEthClient>) -> HopBridge {
        HopBridge::new(
            Arc::new(fixtures::context(vec![client])),
            Arc::new(HopClient::new(HttpClient::new(5000).unwrap(), server_uri)),
        )
    }

    fn eth_attempt(amount: u64) -> TransferAttempt {
        TransferAttempt::new(fixtures::params(
            Network::ethereum(),
            Network::optimism(),
            Token::native("ETH", 1),
            amount,
        ))
    }

    fn dai_attempt() -> TransferAttempt {
        let dai = Token::erc20("DAI", 10, Address::repeat_byte(0xda), 18);
        TransferAttempt::new(fixtures::params(Network::optimism(), Network::arbitrum(), dai, 1_000))
    }

    async fn quote_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/quote"))
            .and(query_param("fromChain", "ethereum"))
            .and(query_param("toChain", "optimism"))
            .and(query_param("token", "ETH"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "amountIn": "1000",
                "slippage": 0.5,
                "amountOutMin": "990",
                "destinationAmountOutMin": "985",
                "bonderFee": "5",
                "estimatedRecieved": "993",
                "deadline": 1_700_000_000,
                "destinationDeadline": 1_700_000_600
            })))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn eligibility_requires_cross_chain_deployment() {
        let hop = bridge("http://127.0.0.1:9", Arc::new(MockEthClient::new(1)));
        assert!(hop.available_for(&eth_attempt(1).params).await.unwrap());

        let same_chain = fixtures::params(Network::ethereum(), Network::ethereum(), Token::native("ETH", 1), 1);
        assert!(!hop.available_for(&same_chain).await.unwrap());

        let swap = eth_attempt(1).params.with_to_token(fixtures::usdc(10));
        assert!(!hop.available_for(&swap).await.unwrap());

        let unknown = Token::erc20("WBTC", 1, Address::repeat_byte(0xbb), 8);
        let params = fixtures::params(Network::ethereum(), Network::optimism(), unknown, 1);
        assert!(!hop.available_for(&params).await.unwrap());
    }

    #[tokio::test]
    async fn quote_drives_fees_amount_out_and_packing() {
        let server = quote_server().await;
        let client = Arc::new(MockEthClient::new(1).with_gas_estimate(Some(100_000)));
        let hop = bridge(&server.uri(), client.clone());
        let mut attempt = eth_attempt(1000);

        let fees = hop.calculate_fees(&mut attempt).await.unwrap();
        assert_eq!(fees.base_fee, U256::from(5u64));
        assert!(fees.token_fee.is_zero());
        assert_eq!(hop.calculate_amount_out(&attempt).await.unwrap(), U256::from(993u64));

        let tx = hop.build_tx(&attempt).await.unwrap();
        assert_eq!(tx.gas(), Some(&U256::from(110_000u64)));
        assert_eq!(tx.value(), Some(&U256::from(1000u64)));
        let decoded = decode_send(HopAbi::L1Eth, tx.data().unwrap()).unwrap();
        assert_eq!(decoded.to_chain_id, U256::from(10u64));
        assert_eq!(decoded.recipient, fixtures::recipient());
        assert_eq!(decoded.amount, U256::from(1000u64));
        assert_eq!(client.estimates.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn amount_out_needs_a_quote() {
        let hop = bridge("http://127.0.0.1:9", Arc::new(MockEthClient::new(1)));
        let err = hop.calculate_amount_out(&eth_attempt(1)).await.unwrap_err();
        assert!(matches!(err, BridgeError::QuoteMissing(_)));
    }

    #[tokio::test]
    async fn unquoted_chain_is_unsupported() {
        let hop = bridge("http://127.0.0.1:9", Arc::new(MockEthClient::new(1)));
        let mut attempt = TransferAttempt::new(fixtures::params(
            Network::ethereum(),
            Network::optimism_sepolia(),
            Token::native("ETH", 1),
            1,
        ));
        let err = hop.calculate_fees(&mut attempt).await.unwrap_err();
        assert!(matches!(err, BridgeError::UnsupportedChain(11_155_420)));
    }

    #[tokio::test]
    async fn missing_code_is_reported() {
        let client = Arc::new(MockEthClient::new(1).with_code(Vec::new()));
        let hop = bridge("http://127.0.0.1:9", client.clone());
        let err = hop.estimate_gas(&mut eth_attempt(1)).await.unwrap_err();
        assert!(matches!(err, BridgeError::NoCode { chain_id: 1, .. }));
        assert!(client.last_estimate().is_none());
    }

    #[tokio::test]
    async fn erc20_estimate_failure_falls_back() {
        let client = Arc::new(MockEthClient::new(10).with_gas_estimate(None));
        let hop = bridge("http://127.0.0.1:9", client);
        let mut attempt = dai_attempt();

        assert_eq!(hop.estimate_gas(&mut attempt).await.unwrap(), 385_000);

        let tx = hop.build_tx(&attempt).await.unwrap();
        assert!(tx.value().unwrap().is_zero());
        let decoded = decode_send(HopAbi::L2AmmWrapper, tx.data().unwrap()).unwrap();
        assert_eq!(decoded.to_chain_id, U256::from(42_161u64));
        assert_eq!(decoded.bonder_fee, Some(U256::zero()));
    }

    #[tokio::test]
    async fn unquoted_send_to_l1_leaves_destination_swap_unset() {
        let client = Arc::new(MockEthClient::new(10).with_gas_estimate(None));
        let hop = bridge("http://127.0.0.1:9", client);
        let dai = Token::erc20("DAI", 10, Address::repeat_byte(0xda), 18);
        let attempt = TransferAttempt::new(fixtures::params(Network::optimism(), Network::ethereum(), dai, 1_000));

        let tx = hop.build_tx(&attempt).await.unwrap();
        let args = decode_call(&[HopAbi::L2AmmWrapper.signature()], "swapAndSend", tx.data().unwrap()).unwrap();
        assert_eq!(args[0], AbiToken::Uint(U256::one()));
        assert_ne!(args[5], AbiToken::Uint(U256::zero()));
        assert_eq!(args[6], AbiToken::Uint(U256::zero()));
        assert_eq!(args[7], AbiToken::Uint(U256::zero()));
    }

    #[tokio::test]
    async fn unquoted_send_between_l2s_keeps_destination_deadline() {
        let client = Arc::new(MockEthClient::new(10).with_gas_estimate(None));
        let hop = bridge("http://127.0.0.1:9", client);

        let tx = hop.build_tx(&dai_attempt()).await.unwrap();
        let args = decode_call(&[HopAbi::L2AmmWrapper.signature()], "swapAndSend", tx.data().unwrap()).unwrap();
        assert_eq!(args[7], args[5]);
        assert_ne!(args[7], AbiToken::Uint(U256::zero()));
    }

    #[tokio::test]
    async fn native_estimate_failure_propagates() {
        let client = Arc::new(MockEthClient::new(1).with_gas_estimate(None));
        let hop = bridge("http://127.0.0.1:9", client);
        let err = hop.estimate_gas(&mut eth_attempt(1)).await.unwrap_err();
        assert!(matches!(err, BridgeError::Blockchain(_)));
    }
}
