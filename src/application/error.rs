//! # Bridge Errors
//!
//! Error taxonomy for the bridge strategies and the submission pipeline.
//!
//! # Error Hierarchy
//!
//! ```text
//! BridgeError
//! ├── eligibility   UnsupportedChain, UnsupportedRoute, TokenNotResolved
//! ├── quote         Quote(QuoteError), QuoteMissing
//! ├── on-chain      NoCode, Blockchain(BlockchainError)
//! ├── packing       AbiNotFound, ContractNotFound, Contract(ContractError)
//! └── pipeline      Signer, AccountMismatch, Nonce, InvalidParams
//! ```
//!
//! Nothing is retried inside the crate. [`BridgeError::is_retryable`] tells a
//! caller whether trying again may help.
//!
//! # Examples
//!
//! ```
//! use bridge_router::application::error::BridgeError;
//!
//! let err = BridgeError::unsupported_route("Hop", "USDC on chain 137");
//! assert!(err.is_eligibility());
//! assert!(!err.is_retryable());
//! ```

use crate::infrastructure::blockchain::BlockchainError;
use crate::infrastructure::contracts::ContractError;
use crate::infrastructure::quotes::QuoteError;
use ethers::types::Address;
use thiserror::Error;

/// Bridge layer error.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    /// No network or client is known for the chain.
    #[error("unsupported chain: {0}")]
    UnsupportedChain(u64),

    /// The bridge cannot carry this transfer.
    #[error("{bridge}: unsupported route: {reason}")]
    UnsupportedRoute {
        /// Bridge name.
        bridge: String,
        /// Why the route is unsupported.
        reason: String,
    },

    /// A token address could not be resolved.
    #[error("token {symbol} not resolved on chain {chain_id}")]
    TokenNotResolved {
        /// Token symbol.
        symbol: String,
        /// Chain searched.
        chain_id: u64,
    },

    /// Quote provider failure.
    #[error("quote error: {0}")]
    Quote(#[from] QuoteError),

    /// A stage that needs a quote ran before fees were calculated.
    #[error("{0}: no quote for this transfer, calculate fees first")]
    QuoteMissing(String),

    /// No bytecode at the resolved contract address.
    #[error("no contract code at {address:?} on chain {chain_id}")]
    NoCode {
        /// Chain queried.
        chain_id: u64,
        /// Address without code.
        address: Address,
    },

    /// Chain RPC failure.
    #[error("blockchain error: {0}")]
    Blockchain(#[from] BlockchainError),

    /// No ABI matches the deployment.
    #[error("abi not found: {0}")]
    AbiNotFound(String),

    /// No contract is deployed for the chain and token.
    #[error("{bridge}: contract not found for {symbol} on chain {chain_id}")]
    ContractNotFound {
        /// Bridge name.
        bridge: String,
        /// Token symbol.
        symbol: String,
        /// Chain searched.
        chain_id: u64,
    },

    /// ABI encoding or decoding failure.
    #[error("contract error: {0}")]
    Contract(ContractError),

    /// Signing failed.
    #[error("signer error: {0}")]
    Signer(String),

    /// The signer account differs from the transaction sender.
    #[error("signer account {signer:?} does not match sender {from:?}")]
    AccountMismatch {
        /// Account of the injected signer.
        signer: Address,
        /// Sender of the transaction.
        from: Address,
    },

    /// Nonce acquisition failed.
    #[error("nonce error: {0}")]
    Nonce(String),

    /// Transfer parameters are incomplete or malformed.
    #[error("invalid params: {0}")]
    InvalidParams(String),
}

impl BridgeError {
    /// Creates an unsupported route error.
    #[must_use]
    pub fn unsupported_route(bridge: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedRoute {
            bridge: bridge.into(),
            reason: reason.into(),
        }
    }

    /// Creates a token not resolved error.
    #[must_use]
    pub fn token_not_resolved(symbol: impl Into<String>, chain_id: u64) -> Self {
        Self::TokenNotResolved {
            symbol: symbol.into(),
            chain_id,
        }
    }

    /// Creates a contract not found error.
    #[must_use]
    pub fn contract_not_found(bridge: impl Into<String>, symbol: impl Into<String>, chain_id: u64) -> Self {
        Self::ContractNotFound {
            bridge: bridge.into(),
            symbol: symbol.into(),
            chain_id,
        }
    }

    /// Creates an invalid params error.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    /// Creates a signer error.
    #[must_use]
    pub fn signer(message: impl Into<String>) -> Self {
        Self::Signer(message.into())
    }

    /// Returns true if the caller should try another bridge.
    #[must_use]
    pub fn is_eligibility(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedChain(_) | Self::UnsupportedRoute { .. } | Self::TokenNotResolved { .. }
        )
    }

    /// Returns true if this error is transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Quote(e) => e.is_retryable(),
            Self::Blockchain(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<ContractError> for BridgeError {
    fn from(error: ContractError) -> Self {
        match error {
            ContractError::Unsupported(message) => Self::AbiNotFound(message),
            other => Self::Contract(other),
        }
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
