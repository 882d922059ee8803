//! # Hop Quote Client
//!
//! Bonder fee quotes from the Hop REST API (`GET /v1/quote`).

use super::error::QuoteResult;
use super::http_client::HttpClient;
use crate::domain::BonderFee;
use crate::domain::network::{ARBITRUM_MAINNET, ETHEREUM_MAINNET, OPTIMISM_MAINNET};
use ethers::types::U256;
use tracing::debug;

/// Slippage sent with every quote request, in percent.
pub const QUOTE_SLIPPAGE: &str = "0.5";

/// Name the Hop API uses for a chain.
#[must_use]
pub fn chain_name(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        ETHEREUM_MAINNET => Some("ethereum"),
        OPTIMISM_MAINNET => Some("optimism"),
        ARBITRUM_MAINNET => Some("arbitrum"),
        _ => None,
    }
}

/// Client for the Hop quote endpoint.
#[derive(Debug, Clone)]
pub struct HopClient {
    http: HttpClient,
    api_url: String,
}

impl HopClient {
    /// Creates a client against `api_url`.
    #[must_use]
    pub fn new(http: HttpClient, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Requests a bonder fee quote for sending `amount` of `symbol`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or any amount in the response
    /// is not a decimal integer.
    pub async fn quote(
        &self,
        amount: U256,
        symbol: &str,
        from_chain: &str,
        to_chain: &str,
    ) -> QuoteResult<BonderFee> {
        debug!(symbol, from_chain, to_chain, %amount, "requesting hop quote");
        let amount = amount.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("token", symbol),
            ("fromChain", from_chain),
            ("toChain", to_chain),
            ("slippage", QUOTE_SLIPPAGE),
        ];
        self.http
            .get_with_params(&format!("{}/v1/quote", self.api_url), &params)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::quotes::error::QuoteError;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quote_body() -> serde_json::Value {
        json!({
            "amountIn": "1000000",
            "slippage": 0.5,
            "amountOutMin": "990000",
            "destinationAmountOutMin": "985000",
            "bonderFee": "2500",
            "estimatedRecieved": "997500",
            "deadline": 1_700_000_000,
            "destinationDeadline": 1_700_000_600
        })
    }

    #[test]
    fn chain_names() {
        assert_eq!(chain_name(1), Some("ethereum"));
        assert_eq!(chain_name(10), Some("optimism"));
        assert_eq!(chain_name(42_161), Some("arbitrum"));
        assert_eq!(chain_name(11_155_111), None);
    }

    #[tokio::test]
    async fn quote_sends_expected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/quote"))
            .and(query_param("amount", "1000000"))
            .and(query_param("token", "USDC.e"))
            .and(query_param("fromChain", "optimism"))
            .and(query_param("toChain", "arbitrum"))
            .and(query_param("slippage", "0.5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(quote_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = HopClient::new(HttpClient::new(5000).unwrap(), server.uri());
        let quote = client
            .quote(U256::from(1_000_000u64), "USDC.e", "optimism", "arbitrum")
            .await
            .unwrap();
        assert_eq!(quote.bonder_fee, U256::from(2500u64));
        assert_eq!(quote.estimated_received, U256::from(997_500u64));
        assert_eq!(quote.destination_deadline, 1_700_000_600);
    }

    #[tokio::test]
    async fn unparseable_amount_rejects_quote() {
        let server = MockServer::start().await;
        let mut body = quote_body();
        body["bonderFee"] = json!("12.5");
        Mock::given(path("/v1/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = HopClient::new(HttpClient::new(5000).unwrap(), server.uri());
        let err = client
            .quote(U256::one(), "ETH", "ethereum", "optimism")
            .await
            .unwrap_err();
        assert!(matches!(err, QuoteError::Protocol { .. }));
        assert!(err.to_string().contains("bonderFee"));
    }
}
