//! # Quote Providers
//!
//! REST clients for the off-chain quote services used by the bridges.
//!
//! ## Available Clients
//!
//! - [`HopClient`]: bonder fee quotes
//! - [`CelerClient`]: cBridge transfer configuration and fee estimates
//! - [`ParaswapClient`]: token lists, price routes and swap transactions
//!
//! None of the clients retry; failures surface as [`QuoteError`].

pub mod cbridge;
pub mod error;
pub mod hop;
pub mod http_client;
pub mod paraswap;

pub use cbridge::{CelerClient, TransferConfig};
pub use error::{QuoteError, QuoteResult};
pub use hop::HopClient;
pub use http_client::HttpClient;
pub use paraswap::{ParaswapClient, ParaswapToken, SwapRequest, SwapTransaction};
