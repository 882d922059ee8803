//! # Celer cBridge Client
//!
//! Transfer configuration and fee estimates from the cBridge gateway.
//!
//! The transfer configuration (supported chains, tokens and pool contracts)
//! is fetched once per host and shared for the lifetime of the client. The
//! first caller fills it; concurrent callers wait for that fill instead of
//! issuing their own request.

use super::error::{QuoteError, QuoteResult};
use super::http_client::HttpClient;
use crate::domain::CelerEstimate;
use ethers::types::{Address, U256};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Placeholder user account sent with fee estimates.
pub const ESTIMATE_USER_ADDRESS: &str = "0xaa47c83316edc05cf9ff7136296b026c5de7eccd";

/// Slippage tolerance sent with fee estimates.
pub const ESTIMATE_SLIPPAGE_TOLERANCE: &str = "500";

/// Error payload embedded in gateway responses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayError {
    /// Gateway error code, zero on success.
    #[serde(default)]
    pub code: i64,
    /// Human-readable message.
    #[serde(default)]
    pub msg: String,
}

/// Chain supported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CelerChain {
    /// EVM chain ID.
    pub id: u64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Symbol of the chain's gas token.
    #[serde(default)]
    pub gas_token_symbol: String,
    /// Celer bridge contract on this chain.
    #[serde(default)]
    pub contract_addr: String,
}

/// Token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CelerToken {
    /// Token symbol.
    pub symbol: String,
    /// Contract address on the chain.
    #[serde(default)]
    pub address: String,
    /// Decimals.
    #[serde(default)]
    pub decimal: u8,
}

/// Token entry in a chain's token list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenEntry {
    /// Token metadata.
    pub token: CelerToken,
}

/// Tokens bridgeable on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ChainTokens {
    /// Bridgeable tokens.
    #[serde(default)]
    pub token: Vec<TokenEntry>,
}

/// `GET /v2/getTransferConfigs` response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TransferConfig {
    /// Error reported by the gateway, if any.
    #[serde(default)]
    pub err: Option<GatewayError>,
    /// Supported chains.
    #[serde(default)]
    pub chains: Vec<CelerChain>,
    /// Bridgeable tokens keyed by chain ID.
    #[serde(default)]
    pub chain_token: HashMap<u64, ChainTokens>,
}

impl TransferConfig {
    /// Returns the chain entry for `chain_id`.
    #[must_use]
    pub fn chain(&self, chain_id: u64) -> Option<&CelerChain> {
        self.chains.iter().find(|chain| chain.id == chain_id)
    }

    /// Whether `symbol` is bridgeable on `chain_id`.
    #[must_use]
    pub fn supports_token(&self, chain_id: u64, symbol: &str) -> bool {
        self.chain_token
            .get(&chain_id)
            .is_some_and(|tokens| tokens.token.iter().any(|entry| entry.token.symbol == symbol))
    }

    /// Pool contract on `chain_id`.
    #[must_use]
    pub fn contract_address(&self, chain_id: u64) -> Option<Address> {
        self.chain(chain_id)
            .and_then(|chain| chain.contract_addr.parse().ok())
    }
}

#[derive(Debug, Deserialize)]
struct EstimateAmtResponse {
    #[serde(default)]
    err: Option<GatewayError>,
    #[serde(flatten)]
    estimate: CelerEstimate,
}

fn reject_gateway_error(err: Option<GatewayError>) -> QuoteResult<()> {
    match err {
        Some(err) => Err(QuoteError::provider(format!("cbridge error {}: {}", err.code, err.msg))),
        None => Ok(()),
    }
}

/// Client for the cBridge gateway, production and test hosts.
#[derive(Debug)]
pub struct CelerClient {
    http: HttpClient,
    prod_url: String,
    test_url: String,
    prod_config: OnceCell<Arc<TransferConfig>>,
    test_config: OnceCell<Arc<TransferConfig>>,
}

impl CelerClient {
    /// Creates a client for the two gateway hosts.
    #[must_use]
    pub fn new(http: HttpClient, prod_url: impl Into<String>, test_url: impl Into<String>) -> Self {
        Self {
            http,
            prod_url: prod_url.into().trim_end_matches('/').to_string(),
            test_url: test_url.into().trim_end_matches('/').to_string(),
            prod_config: OnceCell::new(),
            test_config: OnceCell::new(),
        }
    }

    fn base_url(&self, is_test: bool) -> &str {
        if is_test { &self.test_url } else { &self.prod_url }
    }

    /// Returns the transfer configuration for the test or production host.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or the gateway reports an error.
    /// A failed fetch is not cached.
    pub async fn transfer_config(&self, is_test: bool) -> QuoteResult<Arc<TransferConfig>> {
        let cell = if is_test { &self.test_config } else { &self.prod_config };
        cell.get_or_try_init(|| async {
            let url = format!("{}/v2/getTransferConfigs", self.base_url(is_test));
            debug!(is_test, "fetching cbridge transfer configs");
            let config: TransferConfig = self.http.get(&url).await?;
            reject_gateway_error(config.err.clone())?;
            Ok::<_, QuoteError>(Arc::new(config))
        })
        .await
        .cloned()
    }

    /// Estimates the amount received for a transfer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the gateway reports an error.
    pub async fn estimate_amt(
        &self,
        src_chain_id: u64,
        dst_chain_id: u64,
        symbol: &str,
        amount: U256,
        is_test: bool,
    ) -> QuoteResult<CelerEstimate> {
        debug!(src_chain_id, dst_chain_id, symbol, %amount, "requesting cbridge estimate");
        let src = src_chain_id.to_string();
        let dst = dst_chain_id.to_string();
        let amount = amount.to_string();
        let params = [
            ("src_chain_id", src.as_str()),
            ("dst_chain_id", dst.as_str()),
            ("token_symbol", symbol),
            ("amt", amount.as_str()),
            ("usr_addr", ESTIMATE_USER_ADDRESS),
            ("slippage_tolerance", ESTIMATE_SLIPPAGE_TOLERANCE),
        ];
        let url = format!("{}/v2/estimateAmt", self.base_url(is_test));
        let response: EstimateAmtResponse = self.http.get_with_params(&url, &params).await?;
        reject_gateway_error(response.err)?;
        Ok(response.estimate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_body() -> serde_json::Value {
        json!({
            "err": null,
            "chains": [
                {"id": 1, "name": "Ethereum", "gas_token_symbol": "ETH",
                 "contract_addr": "0x5427FEFA711Eff984124bFBB1AB6fbf5E3DA1820"},
                {"id": 10, "name": "Optimism", "gas_token_symbol": "ETH",
                 "contract_addr": "0x9D39Fc627A6d9d9F8C831c16995b209548cc3401"}
            ],
            "chain_token": {
                "1": {"token": [{"token": {"symbol": "USDC", "address": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "decimal": 6}}]},
                "10": {"token": [{"token": {"symbol": "USDC", "address": "0x7F5c764cBc14f9669B88837ca1490cCa17c31607", "decimal": 6}}]}
            }
        })
    }

    #[tokio::test]
    async fn transfer_config_is_fetched_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/getTransferConfigs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(config_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = Arc::new(CelerClient::new(
            HttpClient::new(5000).unwrap(),
            server.uri(),
            "http://127.0.0.1:9",
        ));
        let (a, b) = tokio::join!(client.transfer_config(false), client.transfer_config(false));
        let config = a.unwrap();
        assert!(Arc::ptr_eq(&config, &b.unwrap()));
        assert!(config.supports_token(10, "USDC"));
        assert!(!config.supports_token(10, "DAI"));
        assert_eq!(
            config.contract_address(1),
            Some("0x5427FEFA711Eff984124bFBB1AB6fbf5E3DA1820".parse().unwrap())
        );

        client.transfer_config(false).await.unwrap();
    }

    #[tokio::test]
    async fn gateway_error_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(path("/v2/getTransferConfigs"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"err": {"code": 500, "msg": "maintenance"}})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = CelerClient::new(HttpClient::new(5000).unwrap(), "http://127.0.0.1:9", server.uri());
        let err = client.transfer_config(true).await.unwrap_err();
        assert!(matches!(err, QuoteError::Provider { .. }));
        assert!(client.transfer_config(true).await.is_err());
    }

    #[tokio::test]
    async fn estimate_amt_sends_fixed_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/estimateAmt"))
            .and(query_param("src_chain_id", "1"))
            .and(query_param("dst_chain_id", "10"))
            .and(query_param("token_symbol", "USDC"))
            .and(query_param("amt", "1000000"))
            .and(query_param("usr_addr", ESTIMATE_USER_ADDRESS))
            .and(query_param("slippage_tolerance", "500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "err": null,
                "eq_value_token_amt": "998000",
                "bridge_rate": 1.0,
                "perc_fee": "500",
                "base_fee": "1500",
                "estimated_receive_amt": "996000",
                "max_slippage": 5000
            })))
            .mount(&server)
            .await;

        let client = CelerClient::new(HttpClient::new(5000).unwrap(), server.uri(), "http://127.0.0.1:9");
        let estimate = client
            .estimate_amt(1, 10, "USDC", U256::from(1_000_000u64), false)
            .await
            .unwrap();
        assert_eq!(estimate.total_fee().unwrap(), U256::from(2000u64));
        assert_eq!(estimate.amount_out().unwrap(), U256::from(998_000u64));
    }
}
