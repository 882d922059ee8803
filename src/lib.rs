//! # Bridge Router
//!
//! Routes a value-transfer intent ("move asset X, amount A, from chain C1 to
//! an address on chain C2") through one of several execution strategies:
//! same-chain transfers, NFT transfers, cross-chain bridges (Hop, Celer
//! cBridge), DEX aggregation (Paraswap) and username registrar calls.
//!
//! ## Layers
//!
//! - [`domain`]: networks, tokens, transfer parameters and the
//!   [`TransactionBridge`](domain::TransactionBridge) sum type
//! - [`infrastructure`]: chain RPC port, contract encoding, REST quote clients
//! - [`application`]: the [`Bridge`](application::bridges::Bridge) strategies,
//!   nonce sequencing, transaction submission and routing
//!
//! ## Flow
//!
//! ```text
//! candidates ──► available_for / can
//!            ──► calculate_fees ──► estimate_gas      (quote stored on the TransferAttempt)
//!            ──► build_tx | send                      (nonce held by a NonceGuard)
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use application::bridges::{Bridge, FeeQuote, ProviderQuote, TransferAttempt};
pub use application::error::{BridgeError, BridgeResult};
pub use application::router::BridgeRouter;
pub use config::RouterConfig;
pub use domain::{BridgeParams, Network, Token, TransactionBridge, TransferArgs};
