//! # Chain Client Port
//!
//! Port definition for the chain RPC calls the bridges need.
//!
//! This module defines the [`EthClient`] trait that abstracts gas estimation,
//! code and nonce lookups, view calls and raw transaction submission.

use async_trait::async_trait;
use ethers::types::{Address, Bytes, H256, U256};
use std::fmt;
use thiserror::Error;

/// Call message for `eth_estimateGas` and `eth_call`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallMsg {
    /// Sender.
    pub from: Address,
    /// Target contract or account.
    pub to: Option<Address>,
    /// Native value attached.
    pub value: U256,
    /// Call data.
    pub data: Bytes,
}

impl CallMsg {
    /// Creates a call message from `from` to `to`.
    #[must_use]
    pub fn new(from: Address, to: Address) -> Self {
        Self {
            from,
            to: Some(to),
            ..Default::default()
        }
    }

    /// Sets the native value.
    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Sets the call data.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }
}

/// Error type for chain operations.
#[derive(Debug, Clone, Error)]
pub enum BlockchainError {
    /// RPC connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Transaction submission error.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Gas estimation error, including reverted estimation.
    #[error("gas estimation error: {0}")]
    GasEstimation(String),

    /// Nonce error.
    #[error("nonce error: {0}")]
    Nonce(String),

    /// Chain not supported.
    #[error("unsupported chain: {0}")]
    UnsupportedChain(u64),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BlockchainError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a transaction error.
    #[must_use]
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Creates a gas estimation error.
    #[must_use]
    pub fn gas_estimation(msg: impl Into<String>) -> Self {
        Self::GasEstimation(msg.into())
    }

    /// Creates a nonce error.
    #[must_use]
    pub fn nonce(msg: impl Into<String>) -> Self {
        Self::Nonce(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if the failure is transport related.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Result type for chain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Chain RPC operations used by the bridges and the transactor.
///
/// None of the methods retry; failures propagate to the caller immediately.
#[async_trait]
pub trait EthClient: Send + Sync + fmt::Debug {
    /// Returns the chain ID this client is connected to.
    fn chain_id(&self) -> u64;

    /// Estimates gas for a call. The raw node estimate is returned; callers
    /// apply their own safety margin.
    ///
    /// # Errors
    ///
    /// Returns an error if the node rejects the call (including reverts).
    async fn estimate_gas(&self, msg: &CallMsg) -> BlockchainResult<u64>;

    /// Returns the code deployed at `address` in the pending state.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn pending_code_at(&self, address: Address) -> BlockchainResult<Bytes>;

    /// Returns the pending nonce of `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn pending_nonce_at(&self, address: Address) -> BlockchainResult<u64>;

    /// Returns the current gas price in wei.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn gas_price(&self) -> BlockchainResult<U256>;

    /// Executes a read-only call against the latest state.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or reverts.
    async fn call(&self, msg: &CallMsg) -> BlockchainResult<Bytes>;

    /// Submits a signed, RLP encoded transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the node rejects the transaction.
    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<H256>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blockchain_error_display() {
        let err = BlockchainError::connection("test");
        assert_eq!(err.to_string(), "connection error: test");

        let err = BlockchainError::UnsupportedChain(137);
        assert_eq!(err.to_string(), "unsupported chain: 137");
    }

    #[test]
    fn only_connection_errors_are_retryable() {
        assert!(BlockchainError::connection("reset").is_retryable());
        assert!(!BlockchainError::gas_estimation("execution reverted").is_retryable());
    }

    #[test]
    fn call_msg_builder() {
        let msg = CallMsg::new(Address::repeat_byte(1), Address::repeat_byte(2))
            .with_value(U256::from(5u64))
            .with_data(vec![1u8, 2, 3]);
        assert_eq!(msg.to, Some(Address::repeat_byte(2)));
        assert_eq!(msg.value, U256::from(5u64));
        assert_eq!(msg.data.len(), 3);
    }
}
