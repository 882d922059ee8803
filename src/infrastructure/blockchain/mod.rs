//! # Blockchain Clients
//!
//! Chain RPC access for Ethereum and L2 networks.
//!
//! ## Available Components
//!
//! - [`EthClient`]: Port for the RPC calls the bridges make
//! - [`EthereumClient`]: ethers-rs implementation of the port
//! - [`ChainClients`]: Registry of clients by chain ID
//! - [`GasEstimator`]: Safety margin applied to gas estimates

pub mod client;
pub mod ethereum;
pub mod gas;
pub mod registry;

pub use client::{BlockchainError, BlockchainResult, CallMsg, EthClient};
pub use ethereum::EthereumClient;
pub use gas::{ERC20_BRIDGE_GAS_FALLBACK, ERC20_TRANSFER_GAS, GasEstimator, NATIVE_TRANSFER_GAS};
pub use registry::ChainClients;
