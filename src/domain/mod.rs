//! # Domain Layer
//!
//! Value objects describing what is moved, where, and how an attempt is
//! carried to the chain.

pub mod network;
pub mod params;
pub mod quote;
pub mod token;
pub mod transaction;

pub use network::{Network, NetworkRegistry};
pub use params::BridgeParams;
pub use quote::{AmountParseError, BonderFee, CelerEstimate, PriceRoute};
pub use token::Token;
pub use transaction::{
    CbridgeTxArgs, EnsRegisterTxArgs, EnsReleaseTxArgs, Erc721TxArgs, HopTxArgs, SendTxArgs,
    SwapTxArgs, TransactionBridge, TransferArgs,
};
