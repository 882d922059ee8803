//! # Ethereum Client
//!
//! [`EthClient`] implementation over an ethers-rs HTTP provider. Works for
//! Ethereum and the EVM rollups alike.

use super::client::{BlockchainError, BlockchainResult, CallMsg, EthClient};
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use std::sync::Arc;

/// Ethereum client implementation using ethers-rs.
#[derive(Debug, Clone)]
pub struct EthereumClient {
    /// The chain this client is connected to.
    chain_id: u64,
    /// RPC provider.
    provider: Arc<Provider<Http>>,
}

impl EthereumClient {
    /// Creates a new Ethereum client.
    ///
    /// # Arguments
    ///
    /// * `chain_id` - The chain to connect to
    /// * `rpc_url` - RPC endpoint URL
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be created.
    pub fn new(chain_id: u64, rpc_url: &str) -> BlockchainResult<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| BlockchainError::connection(e.to_string()))?;

        Ok(Self {
            chain_id,
            provider: Arc::new(provider),
        })
    }

    /// Verifies that the endpoint serves the expected chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails or the chain ID differs.
    pub async fn health_check(&self) -> BlockchainResult<()> {
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| BlockchainError::connection(e.to_string()))?;

        if chain_id.as_u64() != self.chain_id {
            return Err(BlockchainError::internal(format!(
                "chain ID mismatch: expected {}, got {}",
                self.chain_id,
                chain_id.as_u64()
            )));
        }

        Ok(())
    }

    fn to_request(msg: &CallMsg) -> TypedTransaction {
        let mut request = TransactionRequest::new()
            .from(msg.from)
            .value(msg.value)
            .data(msg.data.clone());
        if let Some(to) = msg.to {
            request = request.to(to);
        }
        request.into()
    }
}

#[async_trait]
impl EthClient for EthereumClient {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn estimate_gas(&self, msg: &CallMsg) -> BlockchainResult<u64> {
        let estimate = self
            .provider
            .estimate_gas(&Self::to_request(msg), None)
            .await
            .map_err(|e| BlockchainError::gas_estimation(e.to_string()))?;

        if estimate > U256::from(u64::MAX) {
            return Err(BlockchainError::gas_estimation(format!(
                "estimate out of range: {}",
                estimate
            )));
        }
        Ok(estimate.as_u64())
    }

    async fn pending_code_at(&self, address: Address) -> BlockchainResult<Bytes> {
        self.provider
            .get_code(address, Some(BlockNumber::Pending.into()))
            .await
            .map_err(|e| BlockchainError::connection(e.to_string()))
    }

    async fn pending_nonce_at(&self, address: Address) -> BlockchainResult<u64> {
        self.provider
            .get_transaction_count(address, Some(BlockNumber::Pending.into()))
            .await
            .map(|n| n.low_u64())
            .map_err(|e| BlockchainError::nonce(e.to_string()))
    }

    async fn gas_price(&self) -> BlockchainResult<U256> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| BlockchainError::connection(e.to_string()))
    }

    async fn call(&self, msg: &CallMsg) -> BlockchainResult<Bytes> {
        self.provider
            .call(&Self::to_request(msg), None)
            .await
            .map_err(|e| BlockchainError::transaction(e.to_string()))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<H256> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(|e| BlockchainError::transaction(e.to_string()))?;
        Ok(pending.tx_hash())
    }
}
