//! # Application Layer
//!
//! Bridge strategies and everything needed to carry an attempt to the chain.
//!
//! - [`bridges`]: the [`Bridge`](bridges::Bridge) strategies
//! - [`router`]: candidate selection and concurrent route quoting
//! - [`transactor`]: signing and submission
//! - [`nonce`]: per-account nonce sequencing
//! - [`error`]: the [`BridgeError`](error::BridgeError) taxonomy

pub mod bridges;
pub mod error;
pub mod nonce;
pub mod router;
pub mod transactor;

pub use error::{BridgeError, BridgeResult};
pub use nonce::{NonceGuard, NonceSequencer};
pub use router::{BridgeRouter, RouteError, RouteFailure, RouteQuote, RouteQuotes};
pub use transactor::{Submission, Transactor, TxSigner};
