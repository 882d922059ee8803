//! # Infrastructure Layer
//!
//! Adapters to the outside world.
//!
//! - [`blockchain`]: chain RPC port, ethers adapter and gas limits
//! - [`contracts`]: ABI encoding and the Hop deployment table
//! - [`quotes`]: REST clients for Hop, Celer and Paraswap

pub mod blockchain;
pub mod contracts;
pub mod quotes;
