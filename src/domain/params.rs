//! # Bridge Parameters
//!
//! The caller's transfer intent, shared by every bridge.

use super::network::Network;
use super::token::Token;
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Inputs to eligibility checks, quoting and building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeParams {
    /// Source network.
    pub from_network: Network,
    /// Destination network.
    pub to_network: Network,
    /// Sending account.
    pub from_address: Address,
    /// Recipient on the destination network.
    pub to_address: Address,
    /// Asset being sent.
    pub from_token: Token,
    /// Asset to receive, set only for swap flows.
    #[serde(default)]
    pub to_token: Option<Token>,
    /// Amount in the token's smallest unit.
    pub amount_in: U256,
    /// Sender balance of `from_token`, when known.
    #[serde(default)]
    pub balance: U256,
    /// NFT token ID for collectible transfers.
    #[serde(default)]
    pub collectible_id: Option<U256>,
    /// Username for registrar flows.
    #[serde(default)]
    pub username: Option<String>,
    /// Uncompressed public key (`0x04 || X || Y`) for registrar flows.
    #[serde(default)]
    pub public_key: Option<String>,
    /// Groups the transactions of one user-facing operation.
    #[serde(default)]
    pub multi_transaction_id: Option<i64>,
}

impl BridgeParams {
    /// Creates parameters for a plain transfer between two networks.
    #[must_use]
    pub fn new(
        from_network: Network,
        to_network: Network,
        from_address: Address,
        to_address: Address,
        from_token: Token,
        amount_in: U256,
    ) -> Self {
        Self {
            from_network,
            to_network,
            from_address,
            to_address,
            from_token,
            to_token: None,
            amount_in,
            balance: U256::zero(),
            collectible_id: None,
            username: None,
            public_key: None,
            multi_transaction_id: None,
        }
    }

    /// Sets the destination token, turning the request into a swap.
    #[must_use]
    pub fn with_to_token(mut self, token: Token) -> Self {
        self.to_token = Some(token);
        self
    }

    /// Sets the known sender balance.
    #[must_use]
    pub fn with_balance(mut self, balance: U256) -> Self {
        self.balance = balance;
        self
    }

    /// Sets the NFT token ID.
    #[must_use]
    pub fn with_collectible_id(mut self, id: U256) -> Self {
        self.collectible_id = Some(id);
        self
    }

    /// Sets the registrar username and public key.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>, public_key: Option<String>) -> Self {
        self.username = Some(username.into());
        self.public_key = public_key;
        self
    }

    /// Sets the multi-transaction ID.
    #[must_use]
    pub fn with_multi_transaction_id(mut self, id: i64) -> Self {
        self.multi_transaction_id = Some(id);
        self
    }

    /// Returns true when source and destination are the same chain.
    #[inline]
    #[must_use]
    pub fn is_same_chain(&self) -> bool {
        self.from_network.chain_id == self.to_network.chain_id
    }
}
