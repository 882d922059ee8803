//! # Chain Client Registry
//!
//! Maps chain IDs to their RPC clients.

use super::client::{BlockchainError, BlockchainResult, EthClient};
use super::ethereum::EthereumClient;
use crate::config::ChainEndpoint;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of chain clients keyed by chain ID.
#[derive(Debug, Clone, Default)]
pub struct ChainClients {
    clients: HashMap<u64, Arc<dyn EthClient>>,
}

impl ChainClients {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds ethers clients for every endpoint with an RPC URL.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider cannot be created.
    pub fn from_endpoints(endpoints: &[ChainEndpoint]) -> BlockchainResult<Self> {
        let mut registry = Self::new();
        for endpoint in endpoints {
            let Some(url) = endpoint.rpc_url.as_deref() else {
                continue;
            };
            let client = EthereumClient::new(endpoint.chain_id, url)?;
            registry.insert(Arc::new(client));
        }
        Ok(registry)
    }

    /// Registers a client under its own chain ID.
    pub fn insert(&mut self, client: Arc<dyn EthClient>) {
        self.clients.insert(client.chain_id(), client);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_client(mut self, client: Arc<dyn EthClient>) -> Self {
        self.insert(client);
        self
    }

    /// Returns the client for `chain_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BlockchainError::UnsupportedChain`] if no client is registered.
    pub fn get(&self, chain_id: u64) -> BlockchainResult<Arc<dyn EthClient>> {
        self.clients
            .get(&chain_id)
            .cloned()
            .ok_or(BlockchainError::UnsupportedChain(chain_id))
    }

    /// Chain IDs with a registered client.
    #[must_use]
    pub fn chain_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.clients.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
