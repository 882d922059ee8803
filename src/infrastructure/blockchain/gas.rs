//! # Gas Management
//!
//! Safety margin applied to node estimates and the fixed limits used when
//! no dynamic estimate is taken.

use serde::{Deserialize, Serialize};

/// Gas limit for a native asset transfer.
pub const NATIVE_TRANSFER_GAS: u64 = 22_000;

/// Gas limit for an ERC20 transfer when no estimate is requested.
pub const ERC20_TRANSFER_GAS: u64 = 200_000;

/// Gas used for ERC20 bridge sends whose estimate fails before an allowance
/// is in place.
pub const ERC20_BRIDGE_GAS_FALLBACK: u64 = 350_000;

/// Gas estimator with configurable buffer.
///
/// Applies a percentage buffer to gas estimates to absorb state changes
/// between estimation and submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimator {
    /// Buffer percentage to add to gas estimates (e.g., 10 for 10%).
    buffer_percent: u64,
}

impl GasEstimator {
    /// Default gas buffer percentage.
    pub const DEFAULT_BUFFER_PERCENT: u64 = 10;

    /// Creates a new gas estimator with the specified buffer.
    ///
    /// # Arguments
    ///
    /// * `buffer_percent` - Percentage to add to gas estimates (e.g., 10 for 10%)
    #[must_use]
    pub const fn new(buffer_percent: u64) -> Self {
        Self { buffer_percent }
    }

    /// Creates a gas estimator with the default buffer.
    #[must_use]
    pub const fn with_default_buffer() -> Self {
        Self::new(Self::DEFAULT_BUFFER_PERCENT)
    }

    /// Returns the buffer percentage.
    #[must_use]
    pub const fn buffer_percent(&self) -> u64 {
        self.buffer_percent
    }

    /// Applies the buffer to a gas estimate.
    ///
    /// # Arguments
    ///
    /// * `estimate` - The raw gas estimate
    ///
    /// # Returns
    ///
    /// The buffered gas estimate, saturating at `u64::MAX`.
    #[must_use]
    pub const fn apply_buffer(&self, estimate: u64) -> u64 {
        estimate.saturating_add(estimate.saturating_mul(self.buffer_percent) / 100)
    }
}

impl Default for GasEstimator {
    fn default() -> Self {
        Self::with_default_buffer()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn gas_estimator_apply_buffer() {
        let estimator = GasEstimator::new(20);
        assert_eq!(estimator.apply_buffer(100_000), 120_000);
        assert_eq!(estimator.apply_buffer(200_000), 240_000);
    }

    #[test]
    fn gas_estimator_default_buffer() {
        let estimator = GasEstimator::default();
        assert_eq!(estimator.buffer_percent(), 10);
        assert_eq!(estimator.apply_buffer(ERC20_BRIDGE_GAS_FALLBACK), 385_000);
    }

    #[test]
    fn apply_buffer_saturates() {
        assert_eq!(GasEstimator::default().apply_buffer(u64::MAX), u64::MAX);
    }

    proptest! {
        #[test]
        fn buffered_estimate_never_below_raw(estimate in 1u64..50_000_000, pct in 1u64..100) {
            let buffered = GasEstimator::new(pct).apply_buffer(estimate);
            prop_assert!(buffered >= estimate);
        }
    }
}
