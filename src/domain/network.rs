//! # Networks
//!
//! Chain descriptors and the registry that supplies them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Ethereum mainnet.
pub const ETHEREUM_MAINNET: u64 = 1;
/// Ethereum Sepolia testnet.
pub const ETHEREUM_SEPOLIA: u64 = 11_155_111;
/// Optimism mainnet.
pub const OPTIMISM_MAINNET: u64 = 10;
/// Optimism Sepolia testnet.
pub const OPTIMISM_SEPOLIA: u64 = 11_155_420;
/// Arbitrum One.
pub const ARBITRUM_MAINNET: u64 = 42_161;
/// Arbitrum Sepolia testnet.
pub const ARBITRUM_SEPOLIA: u64 = 421_614;

/// An EVM chain the router can operate on.
///
/// Immutable once built; bridges use it to select contract deployments and
/// to switch between production and test REST hosts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Network {
    /// Numeric chain ID.
    pub chain_id: u64,
    /// Human readable name.
    pub name: String,
    /// Whether this is a test network.
    pub is_test: bool,
    /// Layer (1 for L1, 2 for rollups).
    pub layer: u8,
    /// Symbol of the native asset.
    pub native_symbol: String,
}

impl Network {
    /// Creates a network descriptor.
    #[must_use]
    pub fn new(chain_id: u64, name: impl Into<String>, is_test: bool, layer: u8) -> Self {
        Self {
            chain_id,
            name: name.into(),
            is_test,
            layer,
            native_symbol: "ETH".to_string(),
        }
    }

    /// Overrides the native asset symbol.
    #[must_use]
    pub fn with_native_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.native_symbol = symbol.into();
        self
    }

    /// Ethereum mainnet.
    #[must_use]
    pub fn ethereum() -> Self {
        Self::new(ETHEREUM_MAINNET, "Ethereum", false, 1)
    }

    /// Ethereum Sepolia.
    #[must_use]
    pub fn sepolia() -> Self {
        Self::new(ETHEREUM_SEPOLIA, "Sepolia", true, 1)
    }

    /// Optimism mainnet.
    #[must_use]
    pub fn optimism() -> Self {
        Self::new(OPTIMISM_MAINNET, "Optimism", false, 2)
    }

    /// Optimism Sepolia.
    #[must_use]
    pub fn optimism_sepolia() -> Self {
        Self::new(OPTIMISM_SEPOLIA, "Optimism Sepolia", true, 2)
    }

    /// Arbitrum One.
    #[must_use]
    pub fn arbitrum() -> Self {
        Self::new(ARBITRUM_MAINNET, "Arbitrum", false, 2)
    }

    /// Arbitrum Sepolia.
    #[must_use]
    pub fn arbitrum_sepolia() -> Self {
        Self::new(ARBITRUM_SEPOLIA, "Arbitrum Sepolia", true, 2)
    }

    /// The mainnets and testnets the bridges know about.
    #[must_use]
    pub fn well_known() -> [Network; 6] {
        [
            Self::ethereum(),
            Self::sepolia(),
            Self::optimism(),
            Self::optimism_sepolia(),
            Self::arbitrum(),
            Self::arbitrum_sepolia(),
        ]
    }

    /// Returns true for layer 1 networks.
    #[inline]
    #[must_use]
    pub fn is_l1(&self) -> bool {
        self.layer == 1
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}

/// Lookup of known networks by chain ID.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    networks: HashMap<u64, Network>,
}

impl NetworkRegistry {
    /// Creates a registry from a list of networks. Later entries win on
    /// duplicate chain IDs.
    #[must_use]
    pub fn new(networks: impl IntoIterator<Item = Network>) -> Self {
        Self {
            networks: networks.into_iter().map(|n| (n.chain_id, n)).collect(),
        }
    }

    /// Registry holding the mainnets and testnets the bridges know about.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(Network::well_known())
    }

    /// Finds a network by chain ID.
    #[must_use]
    pub fn find(&self, chain_id: u64) -> Option<&Network> {
        self.networks.get(&chain_id)
    }

    /// Adds or replaces a network.
    pub fn insert(&mut self, network: Network) {
        self.networks.insert(network.chain_id, network);
    }

    /// Number of registered networks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// Returns true if no network is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_finds_known_chains() {
        let registry = NetworkRegistry::with_defaults();
        assert_eq!(registry.len(), 6);
        assert!(registry.find(ETHEREUM_MAINNET).unwrap().is_l1());
        assert!(registry.find(OPTIMISM_SEPOLIA).unwrap().is_test);
        assert!(registry.find(137).is_none());
    }

    #[test]
    fn insert_replaces_existing_chain() {
        let mut registry = NetworkRegistry::with_defaults();
        registry.insert(Network::new(ETHEREUM_MAINNET, "Mainnet fork", true, 1));
        let network = registry.find(ETHEREUM_MAINNET).unwrap();
        assert_eq!(network.name, "Mainnet fork");
        assert!(network.is_test);
    }

    #[test]
    fn display_includes_chain_id() {
        assert_eq!(Network::arbitrum().to_string(), "Arbitrum (42161)");
    }
}
