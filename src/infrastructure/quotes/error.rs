//! # Quote Provider Errors
//!
//! Error types for the off-chain quote providers (Hop, Celer, Paraswap).
//!
//! # Examples
//!
//! ```
//! use bridge_router::infrastructure::quotes::error::QuoteError;
//!
//! let error = QuoteError::timeout("Request timed out after 10000ms");
//! assert!(error.is_retryable());
//!
//! let error = QuoteError::provider("unsupported token");
//! assert!(!error.is_retryable());
//! ```

use crate::domain::AmountParseError;
use thiserror::Error;

/// Error type for quote provider requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuoteError {
    /// Request timed out.
    #[error("quote timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// Network or connection error.
    #[error("quote connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("quote rate limit exceeded: {message}")]
    RateLimited {
        /// Error message.
        message: String,
    },

    /// The provider rejected the request parameters.
    #[error("quote invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },

    /// Response body did not have the expected shape.
    #[error("quote protocol error: {message}")]
    Protocol {
        /// Error message.
        message: String,
    },

    /// The provider answered with an explicit error payload.
    #[error("quote provider error: {message}")]
    Provider {
        /// Error message.
        message: String,
    },

    /// A decimal amount in the response did not parse.
    #[error("quote amount {field} is not a decimal integer: {value:?}")]
    Parse {
        /// JSON field that failed.
        field: String,
        /// Raw value received.
        value: String,
    },
}

impl QuoteError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a provider error.
    #[must_use]
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Creates a parse error for `field`.
    #[must_use]
    pub fn parse(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Parse {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns true if this error is transient.
    ///
    /// The crate never retries; callers may.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connection { .. } | Self::RateLimited { .. }
        )
    }
}

impl From<AmountParseError> for QuoteError {
    fn from(error: AmountParseError) -> Self {
        Self::parse(error.field, error.value)
    }
}

/// Result type for quote provider requests.
pub type QuoteResult<T> = Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(QuoteError::timeout("t").is_retryable());
        assert!(QuoteError::connection("c").is_retryable());
        assert!(QuoteError::rate_limited("r").is_retryable());
    }

    #[test]
    fn payload_errors_are_not_retryable() {
        assert!(!QuoteError::protocol("p").is_retryable());
        assert!(!QuoteError::provider("p").is_retryable());
        assert!(!QuoteError::parse("baseFee", "x").is_retryable());
    }

    #[test]
    fn amount_parse_error_keeps_field() {
        let error = QuoteError::from(AmountParseError {
            field: "percFee",
            value: "1.5".to_string(),
        });
        assert_eq!(error, QuoteError::parse("percFee", "1.5"));
        assert!(error.to_string().contains("percFee"));
    }
}
