//! # Paraswap Client
//!
//! Token lists, price routes and swap transactions from the Paraswap API.
//!
//! Token lists change rarely and are cached per chain behind a read-mostly
//! lock. Price routes are never cached here: each transfer attempt keeps its
//! own route.

use super::error::{QuoteError, QuoteResult};
use super::http_client::HttpClient;
use crate::domain::{PriceRoute, Token, quote::parse_amount};
use ethers::types::{Address, Bytes, U256};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Token as listed by Paraswap.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParaswapToken {
    /// Token symbol.
    pub symbol: String,
    /// Contract address.
    pub address: Address,
    /// Decimals.
    pub decimals: u8,
}

#[derive(Debug, Deserialize)]
struct TokenListResponse {
    #[serde(default)]
    tokens: Vec<ParaswapToken>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceResponse {
    price_route: PriceRoute,
}

/// Body of `POST /transactions/{network}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest<'a> {
    /// Token sold.
    pub src_token: Address,
    /// Decimals of the token sold.
    pub src_decimals: u8,
    /// Token bought.
    pub dest_token: Address,
    /// Decimals of the token bought.
    pub dest_decimals: u8,
    /// Amount sold, decimal string.
    pub src_amount: String,
    /// Minimum amount bought; omitted when slippage is given instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_amount: Option<String>,
    /// Route returned by `/prices`, posted back unchanged.
    pub price_route: &'a PriceRoute,
    /// Account that signs and pays.
    pub user_address: Address,
    /// Account credited with the bought tokens.
    pub receiver: Address,
    /// Slippage in basis points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slippage: Option<u32>,
    /// Partner tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSwapTransaction {
    from: Address,
    to: Address,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(default)]
    data: Bytes,
    #[serde(default)]
    gas_price: Option<serde_json::Value>,
    #[serde(default)]
    gas: Option<serde_json::Value>,
}

/// Transaction returned by the build endpoint; authoritative for value,
/// gas and gas price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapTransaction {
    /// Sender.
    pub from: Address,
    /// Augustus swapper contract.
    pub to: Address,
    /// Native value, zero unless selling the native asset.
    pub value: U256,
    /// Call data.
    pub data: Bytes,
    /// Gas price chosen by Paraswap.
    pub gas_price: Option<U256>,
    /// Gas limit chosen by Paraswap.
    pub gas: Option<u64>,
}

fn amount_field(field: &'static str, value: Option<&serde_json::Value>) -> QuoteResult<Option<U256>> {
    let text = match value {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(other) => return Err(QuoteError::parse(field, other.to_string())),
    };
    Ok(Some(parse_amount(field, &text)?))
}

impl TryFrom<RawSwapTransaction> for SwapTransaction {
    type Error = QuoteError;

    fn try_from(raw: RawSwapTransaction) -> Result<Self, Self::Error> {
        let gas = match amount_field("gas", raw.gas.as_ref())? {
            Some(gas) if gas > U256::from(u64::MAX) => {
                return Err(QuoteError::parse("gas", gas.to_string()));
            }
            Some(gas) => Some(gas.as_u64()),
            None => None,
        };
        Ok(Self {
            from: raw.from,
            to: raw.to,
            value: amount_field("value", raw.value.as_ref())?.unwrap_or_default(),
            data: raw.data,
            gas_price: amount_field("gasPrice", raw.gas_price.as_ref())?,
            gas,
        })
    }
}

/// Client for the Paraswap REST API.
#[derive(Debug)]
pub struct ParaswapClient {
    http: HttpClient,
    api_url: String,
    partner: Option<String>,
    token_lists: RwLock<HashMap<u64, Arc<Vec<ParaswapToken>>>>,
}

impl ParaswapClient {
    /// Creates a client against `api_url`.
    #[must_use]
    pub fn new(http: HttpClient, api_url: impl Into<String>, partner: Option<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            partner,
            token_lists: RwLock::new(HashMap::new()),
        }
    }

    /// Partner tag sent with swap transactions.
    #[must_use]
    pub fn partner(&self) -> Option<&str> {
        self.partner.as_deref()
    }

    /// Returns the token list for `chain_id`, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be fetched.
    pub async fn tokens(&self, chain_id: u64) -> QuoteResult<Arc<Vec<ParaswapToken>>> {
        if let Some(tokens) = self.token_lists.read().get(&chain_id) {
            return Ok(Arc::clone(tokens));
        }

        debug!(chain_id, "fetching paraswap token list");
        let response: TokenListResponse = self
            .http
            .get(&format!("{}/tokens/{}", self.api_url, chain_id))
            .await?;
        let tokens = Arc::new(response.tokens);
        self.token_lists
            .write()
            .entry(chain_id)
            .or_insert_with(|| Arc::clone(&tokens));
        Ok(tokens)
    }

    /// Looks up `symbol` in the token list of `chain_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be fetched.
    pub async fn find_token(&self, chain_id: u64, symbol: &str) -> QuoteResult<Option<ParaswapToken>> {
        let tokens = self.tokens(chain_id).await?;
        Ok(tokens.iter().find(|token| token.symbol == symbol).cloned())
    }

    /// Fetches a sell-side price route from `src` to `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the route is malformed.
    pub async fn price_route(
        &self,
        chain_id: u64,
        src: &Token,
        dest: &Token,
        amount: U256,
    ) -> QuoteResult<PriceRoute> {
        debug!(chain_id, src = %src.symbol, dest = %dest.symbol, %amount, "requesting paraswap price route");
        let src_token = format!("{:?}", src.contract_address());
        let dest_token = format!("{:?}", dest.contract_address());
        let src_decimals = src.decimals.to_string();
        let dest_decimals = dest.decimals.to_string();
        let amount = amount.to_string();
        let network = chain_id.to_string();
        let params = [
            ("srcToken", src_token.as_str()),
            ("srcDecimals", src_decimals.as_str()),
            ("destToken", dest_token.as_str()),
            ("destDecimals", dest_decimals.as_str()),
            ("amount", amount.as_str()),
            ("side", "SELL"),
            ("network", network.as_str()),
        ];
        let response: PriceResponse = self
            .http
            .get_with_params(&format!("{}/prices", self.api_url), &params)
            .await?;
        Ok(response.price_route)
    }

    /// Builds the swap transaction for a previously fetched route.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the transaction is malformed.
    pub async fn build_transaction(
        &self,
        chain_id: u64,
        request: &SwapRequest<'_>,
    ) -> QuoteResult<SwapTransaction> {
        debug!(chain_id, "building paraswap transaction");
        let raw: RawSwapTransaction = self
            .http
            .post_with_params(
                &format!("{}/transactions/{}", self.api_url, chain_id),
                &[("ignoreChecks", "true")],
                request,
            )
            .await?;
        SwapTransaction::try_from(raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
    const DAI: &str = "0x6b175474e89094c44da98b954eedeac495271d0f";

    fn route_json() -> serde_json::Value {
        json!({
            "srcToken": USDC,
            "srcAmount": "1000000",
            "destToken": DAI,
            "destAmount": "999000000000000000",
            "gasCost": "180000",
            "tokenTransferProxy": "0x216b4b4ba9f3e719726886d34a177484278bfcae"
        })
    }

    fn client(server: &MockServer) -> ParaswapClient {
        ParaswapClient::new(HttpClient::new(5000).unwrap(), server.uri(), None)
    }

    #[tokio::test]
    async fn token_list_is_cached_per_chain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tokens/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tokens": [{"symbol": "USDC", "address": USDC, "decimals": 6}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let usdc = client.find_token(1, "USDC").await.unwrap().unwrap();
        assert_eq!(usdc.decimals, 6);
        assert!(client.find_token(1, "DAI").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn price_route_uses_sell_side() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/prices"))
            .and(query_param("srcToken", USDC))
            .and(query_param("destToken", DAI))
            .and(query_param("srcDecimals", "6"))
            .and(query_param("destDecimals", "18"))
            .and(query_param("amount", "1000000"))
            .and(query_param("side", "SELL"))
            .and(query_param("network", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"priceRoute": route_json()})))
            .expect(1)
            .mount(&server)
            .await;

        let src = Token::erc20("USDC", 1, USDC.parse().unwrap(), 6);
        let dest = Token::erc20("DAI", 1, DAI.parse().unwrap(), 18);
        let route = client(&server)
            .price_route(1, &src, &dest, U256::from(1_000_000u64))
            .await
            .unwrap();
        assert_eq!(route.gas_cost(), 180_000);
        assert_eq!(route.raw(), &route_json());
    }

    #[tokio::test]
    async fn build_transaction_posts_route_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transactions/1"))
            .and(query_param("ignoreChecks", "true"))
            .and(body_partial_json(json!({"priceRoute": route_json(), "srcAmount": "1000000"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "from": "0x1111111111111111111111111111111111111111",
                "to": "0xdef171fe48cf0115b1d80b88dc8eab59176fee57",
                "value": "0",
                "data": "0xdeadbeef",
                "gasPrice": "30000000000",
                "gas": "210000",
                "chainId": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let route = PriceRoute::try_from(route_json()).unwrap();
        let request = SwapRequest {
            src_token: USDC.parse().unwrap(),
            src_decimals: 6,
            dest_token: DAI.parse().unwrap(),
            dest_decimals: 18,
            src_amount: "1000000".to_string(),
            dest_amount: None,
            price_route: &route,
            user_address: Address::repeat_byte(0x11),
            receiver: Address::repeat_byte(0x11),
            slippage: Some(100),
            partner: None,
        };
        let tx = client(&server).build_transaction(1, &request).await.unwrap();
        assert_eq!(tx.gas, Some(210_000));
        assert_eq!(tx.gas_price, Some(U256::from(30_000_000_000u64)));
        assert_eq!(tx.data.to_vec(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(tx.value.is_zero());
    }
}
