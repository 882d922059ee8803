//! Test doubles shared by the unit tests.

#![allow(clippy::unwrap_used)]

use crate::infrastructure::blockchain::{BlockchainError, BlockchainResult, CallMsg, EthClient};
use async_trait::async_trait;
use ethers::types::{Bytes, H256, U256};
use ethers::utils::keccak256;
use std::sync::Mutex;

/// In-memory [`EthClient`] with scripted responses.
#[derive(Debug)]
pub struct MockEthClient {
    chain_id: u64,
    pub pending_nonce: Mutex<u64>,
    pub gas_estimate: Mutex<Option<u64>>,
    pub code: Mutex<Bytes>,
    pub call_result: Mutex<Bytes>,
    pub gas_price: U256,
    pub estimates: Mutex<Vec<CallMsg>>,
    pub calls: Mutex<Vec<CallMsg>>,
    pub raw_transactions: Mutex<Vec<Bytes>>,
    pub reject_send: Mutex<bool>,
}

impl MockEthClient {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            pending_nonce: Mutex::new(0),
            gas_estimate: Mutex::new(Some(50_000)),
            code: Mutex::new(Bytes::from(vec![0x60u8, 0x80])),
            call_result: Mutex::new(Bytes::default()),
            gas_price: U256::from(1_000_000_000u64),
            estimates: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            raw_transactions: Mutex::new(Vec::new()),
            reject_send: Mutex::new(false),
        }
    }

    pub fn with_pending_nonce(self, nonce: u64) -> Self {
        *self.pending_nonce.lock().unwrap() = nonce;
        self
    }

    /// `None` makes every estimate fail as a revert.
    pub fn with_gas_estimate(self, estimate: Option<u64>) -> Self {
        *self.gas_estimate.lock().unwrap() = estimate;
        self
    }

    pub fn with_code(self, code: Vec<u8>) -> Self {
        *self.code.lock().unwrap() = Bytes::from(code);
        self
    }

    pub fn with_call_result(self, result: Vec<u8>) -> Self {
        *self.call_result.lock().unwrap() = Bytes::from(result);
        self
    }

    pub fn rejecting_sends(self) -> Self {
        *self.reject_send.lock().unwrap() = true;
        self
    }

    pub fn last_estimate(&self) -> Option<CallMsg> {
        self.estimates.lock().unwrap().last().cloned()
    }

    pub fn sent_count(&self) -> usize {
        self.raw_transactions.lock().unwrap().len()
    }
}

#[async_trait]
impl EthClient for MockEthClient {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn estimate_gas(&self, msg: &CallMsg) -> BlockchainResult<u64> {
        self.estimates.lock().unwrap().push(msg.clone());
        self.gas_estimate
            .lock()
            .unwrap()
            .ok_or_else(|| BlockchainError::gas_estimation("execution reverted"))
    }

    async fn pending_code_at(&self, _address: ethers::types::Address) -> BlockchainResult<Bytes> {
        Ok(self.code.lock().unwrap().clone())
    }

    async fn pending_nonce_at(&self, _address: ethers::types::Address) -> BlockchainResult<u64> {
        Ok(*self.pending_nonce.lock().unwrap())
    }

    async fn gas_price(&self) -> BlockchainResult<U256> {
        Ok(self.gas_price)
    }

    async fn call(&self, msg: &CallMsg) -> BlockchainResult<Bytes> {
        self.calls.lock().unwrap().push(msg.clone());
        Ok(self.call_result.lock().unwrap().clone())
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> BlockchainResult<H256> {
        if *self.reject_send.lock().unwrap() {
            return Err(BlockchainError::transaction("nonce too low"));
        }
        let hash = H256::from(keccak256(&raw));
        self.raw_transactions.lock().unwrap().push(raw);
        Ok(hash)
    }
}
