//! # Provider Quotes
//!
//! Off-chain quotes returned by the bridge and swap providers. Numeric fields
//! arrive as decimal strings; a quote whose amounts do not parse is rejected
//! as a whole.

use ethers::types::{Address, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Error raised when a decimal amount in a quote does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountParseError {
    /// JSON field that failed.
    pub field: &'static str,
    /// Raw value received.
    pub value: String,
}

impl fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid decimal amount in {}: {:?}", self.field, self.value)
    }
}

impl std::error::Error for AmountParseError {}

/// Parses a base-10 big integer.
///
/// # Errors
///
/// Returns [`AmountParseError`] if `value` is empty or not a decimal integer.
pub fn parse_amount(field: &'static str, value: &str) -> Result<U256, AmountParseError> {
    U256::from_dec_str(value.trim()).map_err(|_| AmountParseError {
        field,
        value: value.to_string(),
    })
}

/// Hop `/v1/quote` response. Serializes back to the provider's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBonderFee", into = "RawBonderFee")]
pub struct BonderFee {
    /// Amount sent, after any AMM adjustment.
    pub amount_in: U256,
    /// Slippage percentage used for the quote.
    pub slippage: f32,
    /// Minimum amount out on the source AMM.
    pub amount_out_min: U256,
    /// Minimum amount out on the destination AMM.
    pub destination_amount_out_min: U256,
    /// Fee paid to the bonder, destination gas included.
    pub bonder_fee: U256,
    /// Amount the recipient is expected to receive.
    pub estimated_received: U256,
    /// Source swap deadline (unix seconds).
    pub deadline: i64,
    /// Destination swap deadline (unix seconds), zero when not provided.
    pub destination_deadline: i64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBonderFee {
    amount_in: String,
    #[serde(default)]
    slippage: f32,
    amount_out_min: String,
    destination_amount_out_min: String,
    bonder_fee: String,
    // The provider misspells this field.
    #[serde(rename = "estimatedRecieved")]
    estimated_received: String,
    deadline: i64,
    #[serde(default)]
    destination_deadline: Option<i64>,
}

impl TryFrom<RawBonderFee> for BonderFee {
    type Error = AmountParseError;

    fn try_from(raw: RawBonderFee) -> Result<Self, Self::Error> {
        Ok(Self {
            amount_in: parse_amount("amountIn", &raw.amount_in)?,
            slippage: raw.slippage,
            amount_out_min: parse_amount("amountOutMin", &raw.amount_out_min)?,
            destination_amount_out_min: parse_amount(
                "destinationAmountOutMin",
                &raw.destination_amount_out_min,
            )?,
            bonder_fee: parse_amount("bonderFee", &raw.bonder_fee)?,
            estimated_received: parse_amount("estimatedRecieved", &raw.estimated_received)?,
            deadline: raw.deadline,
            destination_deadline: raw.destination_deadline.unwrap_or_default(),
        })
    }
}

impl From<BonderFee> for RawBonderFee {
    fn from(fee: BonderFee) -> Self {
        Self {
            amount_in: fee.amount_in.to_string(),
            slippage: fee.slippage,
            amount_out_min: fee.amount_out_min.to_string(),
            destination_amount_out_min: fee.destination_amount_out_min.to_string(),
            bonder_fee: fee.bonder_fee.to_string(),
            estimated_received: fee.estimated_received.to_string(),
            deadline: fee.deadline,
            destination_deadline: Some(fee.destination_deadline),
        }
    }
}

/// Celer `/v2/estimateAmt` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CelerEstimate {
    /// Equivalent value in the destination token.
    #[serde(default)]
    pub eq_value_token_amt: String,
    /// Exchange rate applied by the bridge.
    #[serde(default)]
    pub bridge_rate: f64,
    /// Percentage fee in token units.
    #[serde(default)]
    pub perc_fee: String,
    /// Base fee in token units.
    #[serde(default)]
    pub base_fee: String,
    /// Amount the recipient receives after fees.
    #[serde(default)]
    pub estimated_receive_amt: String,
    /// Max slippage suggested by the provider.
    #[serde(default)]
    pub max_slippage: u32,
}

impl CelerEstimate {
    /// Cross-chain fee: base fee plus percentage fee.
    ///
    /// # Errors
    ///
    /// Returns [`AmountParseError`] if either fee fails to parse.
    pub fn total_fee(&self) -> Result<U256, AmountParseError> {
        let base = parse_amount("base_fee", &self.base_fee)?;
        let perc = parse_amount("perc_fee", &self.perc_fee)?;
        Ok(base.saturating_add(perc))
    }

    /// Expected amount out.
    ///
    /// # Errors
    ///
    /// Returns [`AmountParseError`] if the amount fails to parse.
    pub fn amount_out(&self) -> Result<U256, AmountParseError> {
        parse_amount("eq_value_token_amt", &self.eq_value_token_amt)
    }
}

/// Paraswap price route. Kept verbatim as JSON so it can be posted back to
/// the transaction endpoint unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRoute {
    src_amount: U256,
    dest_amount: U256,
    gas_cost: u64,
    token_transfer_proxy: Option<Address>,
    raw: serde_json::Value,
}

impl PriceRoute {
    /// Amount of source token swapped.
    #[must_use]
    pub fn src_amount(&self) -> U256 {
        self.src_amount
    }

    /// Expected amount of destination token.
    #[must_use]
    pub fn dest_amount(&self) -> U256 {
        self.dest_amount
    }

    /// Gas units the route is expected to consume.
    #[must_use]
    pub fn gas_cost(&self) -> u64 {
        self.gas_cost
    }

    /// Spender that must be approved for the source token.
    #[must_use]
    pub fn token_transfer_proxy(&self) -> Option<Address> {
        self.token_transfer_proxy
    }

    /// The route as received.
    #[must_use]
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }
}

impl TryFrom<serde_json::Value> for PriceRoute {
    type Error = AmountParseError;

    fn try_from(raw: serde_json::Value) -> Result<Self, Self::Error> {
        let text = |field: &'static str| -> String {
            match raw.get(field) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Number(n)) => n.to_string(),
                _ => String::new(),
            }
        };
        let gas_cost = parse_amount("gasCost", &text("gasCost"))?;
        if gas_cost > U256::from(u64::MAX) {
            return Err(AmountParseError {
                field: "gasCost",
                value: gas_cost.to_string(),
            });
        }
        Ok(Self {
            src_amount: parse_amount("srcAmount", &text("srcAmount"))?,
            dest_amount: parse_amount("destAmount", &text("destAmount"))?,
            gas_cost: gas_cost.as_u64(),
            token_transfer_proxy: text("tokenTransferProxy").parse().ok(),
            raw,
        })
    }
}

impl Serialize for PriceRoute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PriceRoute {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}
