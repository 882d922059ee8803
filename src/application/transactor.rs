//! # Transactor
//!
//! Turns [`SendTxArgs`] into a transaction, either returned unsigned or
//! signed and submitted.
//!
//! ```text
//! check signer ──► acquire nonce ──► fill gas / gas price ──► build
//!                                                  └─► sign ──► submit ──► release(outcome)
//! ```
//!
//! The build path never advances the nonce.

use crate::application::error::{BridgeError, BridgeResult};
use crate::application::nonce::NonceSequencer;
use crate::domain::SendTxArgs;
use crate::infrastructure::blockchain::{CallMsg, ChainClients, EthClient, GasEstimator};
use async_trait::async_trait;
use ethers::signers::Signer;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, H256, Signature, TransactionRequest};
use std::sync::Arc;
use tracing::{debug, info};

/// Injected signer.
#[async_trait]
pub trait TxSigner: Send + Sync {
    /// Account the signer signs for.
    fn address(&self) -> Address;

    /// Signs a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Signer`] if signing fails.
    async fn sign(&self, tx: &TypedTransaction) -> BridgeResult<Signature>;
}

#[async_trait]
impl<S: Signer> TxSigner for S {
    fn address(&self) -> Address {
        Signer::address(self)
    }

    async fn sign(&self, tx: &TypedTransaction) -> BridgeResult<Signature> {
        self.sign_transaction(tx)
            .await
            .map_err(|e| BridgeError::signer(e.to_string()))
    }
}

/// Outcome of [`Transactor::send_or_build`].
#[derive(Debug, Clone)]
pub enum Submission {
    /// Unsigned transaction; nothing was submitted.
    Built(TypedTransaction),
    /// Signed transaction accepted by the node.
    Sent {
        /// Transaction hash.
        hash: H256,
        /// The transaction as signed.
        tx: TypedTransaction,
    },
}

impl Submission {
    /// The transaction, signed or not.
    #[must_use]
    pub fn transaction(&self) -> &TypedTransaction {
        match self {
            Self::Built(tx) | Self::Sent { tx, .. } => tx,
        }
    }

    /// Hash of a sent transaction.
    #[must_use]
    pub fn hash(&self) -> Option<H256> {
        match self {
            Self::Built(_) => None,
            Self::Sent { hash, .. } => Some(*hash),
        }
    }
}

/// Builds, signs and submits transactions with exclusive nonces.
#[derive(Debug, Clone)]
pub struct Transactor {
    clients: ChainClients,
    nonces: Arc<NonceSequencer>,
    gas: GasEstimator,
}

impl Transactor {
    /// Creates a transactor over `clients`.
    #[must_use]
    pub fn new(clients: ChainClients, nonces: Arc<NonceSequencer>, gas: GasEstimator) -> Self {
        Self { clients, nonces, gas }
    }

    /// Chain clients used for submission.
    #[must_use]
    pub fn clients(&self) -> &ChainClients {
        &self.clients
    }

    /// Nonce sequencer shared by every send.
    #[must_use]
    pub fn nonces(&self) -> &Arc<NonceSequencer> {
        &self.nonces
    }

    /// Gas safety margin.
    #[must_use]
    pub fn gas(&self) -> GasEstimator {
        self.gas
    }

    /// Builds the transaction for `args`; with a signer, also signs and
    /// submits it.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::AccountMismatch`] if the signer is not `from`,
    /// or any nonce, estimation, signing or submission failure. The nonce is
    /// rolled back on every failure.
    pub async fn send_or_build(
        &self,
        chain_id: u64,
        args: &SendTxArgs,
        signer: Option<&dyn TxSigner>,
    ) -> BridgeResult<Submission> {
        if let Some(signer) = signer {
            let account = signer.address();
            if account != args.from {
                return Err(BridgeError::AccountMismatch {
                    signer: account,
                    from: args.from,
                });
            }
        }

        let client = self
            .clients
            .get(chain_id)
            .map_err(|_| BridgeError::UnsupportedChain(chain_id))?;
        let guard = self.nonces.acquire(chain_id, args.from, client.as_ref()).await?;
        let nonce = guard.nonce();

        let tx = match self.build(chain_id, client.as_ref(), args, nonce).await {
            Ok(tx) => tx,
            Err(e) => {
                guard.release(false);
                return Err(e);
            }
        };

        let Some(signer) = signer else {
            guard.release(false);
            debug!(chain_id, nonce, "transaction built");
            return Ok(Submission::Built(tx));
        };

        let result = async {
            let signature = signer.sign(&tx).await?;
            let raw = tx.rlp_signed(&signature);
            Ok::<_, BridgeError>(client.send_raw_transaction(raw).await?)
        }
        .await;
        guard.release(result.is_ok());

        let hash = result?;
        info!(chain_id, ?hash, nonce, from = ?args.from, "transaction submitted");
        Ok(Submission::Sent { hash, tx })
    }

    async fn build(
        &self,
        chain_id: u64,
        client: &dyn EthClient,
        args: &SendTxArgs,
        nonce: u64,
    ) -> BridgeResult<TypedTransaction> {
        let value = args.value.unwrap_or_default();
        let gas = match args.gas {
            Some(gas) => gas,
            None => {
                let msg = CallMsg {
                    from: args.from,
                    to: args.to,
                    value,
                    data: args.data.clone(),
                };
                self.gas.apply_buffer(client.estimate_gas(&msg).await?)
            }
        };
        let gas_price = match args.gas_price {
            Some(price) => price,
            None => client.gas_price().await?,
        };

        let mut request = TransactionRequest::new()
            .from(args.from)
            .value(value)
            .data(args.data.clone())
            .gas(gas)
            .gas_price(gas_price)
            .nonce(nonce)
            .chain_id(chain_id);
        if let Some(to) = args.to {
            request = request.to(to);
        }
        Ok(TypedTransaction::Legacy(request))
    }
}
