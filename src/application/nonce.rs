//! # Nonce Sequencing
//!
//! Exclusive nonce allocation per `(chain, account)`.
//!
//! [`NonceSequencer::acquire`] locks the account's slot and returns a
//! [`NonceGuard`]. The slot stays locked until the guard is released or
//! dropped, so two sends for the same account never observe the same nonce.
//! Releasing with `true` commits the nonce; releasing with `false`, or
//! dropping the guard unreleased, rolls it back.

use crate::application::error::{BridgeError, BridgeResult};
use crate::infrastructure::blockchain::EthClient;
use dashmap::DashMap;
use ethers::types::Address;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct NonceSlot {
    /// Next nonce after the last committed send; `None` until one succeeds.
    next: Option<u64>,
}

/// Hands out nonces under a per-account lock.
#[derive(Debug, Default)]
pub struct NonceSequencer {
    slots: DashMap<(u64, Address), Arc<Mutex<NonceSlot>>>,
}

impl NonceSequencer {
    /// Creates an empty sequencer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, chain_id: u64, account: Address) -> Arc<Mutex<NonceSlot>> {
        Arc::clone(
            self.slots
                .entry((chain_id, account))
                .or_default()
                .value(),
        )
    }

    /// Locks the account and reserves its next nonce.
    ///
    /// The nonce is the larger of the chain's pending nonce and the locally
    /// committed counter. Waits while another guard for the same account is
    /// alive.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Nonce`] if the pending nonce cannot be read.
    /// The lock is released in that case.
    pub async fn acquire(
        &self,
        chain_id: u64,
        account: Address,
        client: &dyn EthClient,
    ) -> BridgeResult<NonceGuard> {
        let slot = self.slot(chain_id, account).lock_owned().await;
        let pending = client
            .pending_nonce_at(account)
            .await
            .map_err(|e| BridgeError::Nonce(e.to_string()))?;
        let nonce = slot.next.map_or(pending, |next| next.max(pending));
        debug!(chain_id, ?account, nonce, "nonce acquired");
        Ok(NonceGuard {
            slot: Some(slot),
            chain_id,
            account,
            nonce,
        })
    }

    /// Runs `f` with a reserved nonce and releases it with the outcome.
    ///
    /// # Errors
    ///
    /// Returns the acquisition error or the error produced by `f`.
    pub async fn with_nonce<T, F, Fut>(
        &self,
        chain_id: u64,
        account: Address,
        client: &dyn EthClient,
        f: F,
    ) -> BridgeResult<T>
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = BridgeResult<T>>,
    {
        let guard = self.acquire(chain_id, account, client).await?;
        let result = f(guard.nonce()).await;
        guard.release(result.is_ok());
        result
    }
}

/// A reserved nonce. Holds the account lock until released or dropped.
#[derive(Debug)]
#[must_use = "dropping the guard rolls the nonce back"]
pub struct NonceGuard {
    slot: Option<OwnedMutexGuard<NonceSlot>>,
    chain_id: u64,
    account: Address,
    nonce: u64,
}

impl NonceGuard {
    /// The reserved nonce.
    #[must_use]
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Releases the lock, committing the nonce if `success`.
    pub fn release(mut self, success: bool) {
        if let Some(mut slot) = self.slot.take() {
            if success {
                slot.next = Some(self.nonce.saturating_add(1));
            }
            debug!(chain_id = self.chain_id, account = ?self.account, nonce = self.nonce, success, "nonce released");
        }
    }
}

impl Drop for NonceGuard {
    fn drop(&mut self) {
        if self.slot.take().is_some() {
            warn!(
                chain_id = self.chain_id,
                account = ?self.account,
                nonce = self.nonce,
                "nonce guard dropped without release, rolling back"
            );
        }
    }
}
