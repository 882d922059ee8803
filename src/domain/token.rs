//! # Tokens
//!
//! Asset descriptors. A token without an address (or with the zero address)
//! is the chain's native asset.

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An asset on a specific chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Ticker symbol, e.g. `USDC`.
    pub symbol: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Chain the token lives on.
    pub chain_id: u64,
    /// Contract address; `None` for the native asset.
    #[serde(default)]
    pub address: Option<Address>,
    /// Number of decimals.
    pub decimals: u8,
}

impl Token {
    /// Creates an ERC20 token.
    #[must_use]
    pub fn erc20(symbol: impl Into<String>, chain_id: u64, address: Address, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            name: String::new(),
            chain_id,
            address: Some(address),
            decimals,
        }
    }

    /// Creates a native asset token with 18 decimals.
    #[must_use]
    pub fn native(symbol: impl Into<String>, chain_id: u64) -> Self {
        Self {
            symbol: symbol.into(),
            name: String::new(),
            chain_id,
            address: None,
            decimals: 18,
        }
    }

    /// Creates a token known only by symbol, pending address discovery.
    #[must_use]
    pub fn unresolved(symbol: impl Into<String>, chain_id: u64, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            name: String::new(),
            chain_id,
            address: None,
            decimals,
        }
    }

    /// Returns true if this is the chain's native asset.
    #[inline]
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.address.is_none_or(|a| a.is_zero())
    }

    /// Fills in an address discovered from a token list.
    #[must_use]
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Fills in decimals discovered from a token list.
    #[must_use]
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    /// Address to hand to contracts: the zero address for the native asset.
    #[must_use]
    pub fn contract_address(&self) -> Address {
        self.address.unwrap_or_else(Address::zero)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.chain_id)
    }
}
