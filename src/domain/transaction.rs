//! # Transaction Bridge
//!
//! Per-attempt transaction arguments. [`TransferArgs`] is a closed sum type:
//! exactly one strategy-specific payload is present, so the uniform accessors
//! on [`TransactionBridge`] never observe a missing variant.

use super::quote::{BonderFee, PriceRoute};
use super::token::Token;
use ethers::types::{Address, Bytes, U256};

/// Base send arguments shared by every strategy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendTxArgs {
    /// Sending account.
    pub from: Address,
    /// Transaction target.
    pub to: Option<Address>,
    /// Native value attached.
    pub value: Option<U256>,
    /// Call data.
    pub data: Bytes,
    /// Gas limit; estimated when absent.
    pub gas: Option<u64>,
    /// Gas price; fetched from the chain when absent.
    pub gas_price: Option<U256>,
    /// Nonce; assigned under the nonce lock right before building.
    pub nonce: Option<u64>,
    /// Groups the transactions of one user-facing operation.
    pub multi_transaction_id: Option<i64>,
}

impl SendTxArgs {
    /// Creates arguments sending from `from` to `to`.
    #[must_use]
    pub fn new(from: Address, to: Address) -> Self {
        Self {
            from,
            to: Some(to),
            ..Default::default()
        }
    }

    /// Sets the native value.
    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the call data.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    /// Sets the gas limit.
    #[must_use]
    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }
}

/// Hop bridge transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct HopTxArgs {
    /// Base arguments.
    pub base: SendTxArgs,
    /// Destination chain ID.
    pub chain_id: u64,
    /// Asset being bridged.
    pub token: Token,
    /// Recipient on the destination chain.
    pub recipient: Address,
    /// Amount to bridge.
    pub amount: U256,
    /// Bonder fee to pay.
    pub bonder_fee: U256,
    /// Quote obtained during fee calculation for this attempt.
    pub quote: Option<BonderFee>,
}

/// Celer cBridge transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbridgeTxArgs {
    /// Base arguments.
    pub base: SendTxArgs,
    /// Destination chain ID.
    pub chain_id: u64,
    /// Asset being bridged.
    pub token: Token,
    /// Recipient on the destination chain.
    pub recipient: Address,
    /// Amount to bridge.
    pub amount: U256,
}

/// ERC-721 transfer. `base.to` is the collection contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc721TxArgs {
    /// Base arguments.
    pub base: SendTxArgs,
    /// Token ID within the collection.
    pub token_id: U256,
    /// New owner.
    pub recipient: Address,
}

/// Paraswap swap.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapTxArgs {
    /// Base arguments.
    pub base: SendTxArgs,
    /// Token sold.
    pub from_token: Token,
    /// Token bought.
    pub to_token: Token,
    /// Amount sold.
    pub amount_in: U256,
    /// Receiver of the bought tokens.
    pub recipient: Address,
    /// Route fetched while estimating.
    pub price_route: Option<PriceRoute>,
}

/// Username registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsRegisterTxArgs {
    /// Base arguments.
    pub base: SendTxArgs,
    /// Username to register.
    pub username: String,
    /// Uncompressed public key.
    pub public_key: String,
}

/// Username release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsReleaseTxArgs {
    /// Base arguments.
    pub base: SendTxArgs,
    /// Username to release.
    pub username: String,
}

/// Strategy-specific transaction payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferArgs {
    /// Plain same-chain send.
    Simple(SendTxArgs),
    /// Same-chain transfer with dynamic gas.
    Transfer(SendTxArgs),
    /// Hop bridge transfer.
    Hop(HopTxArgs),
    /// Celer cBridge transfer.
    Cbridge(CbridgeTxArgs),
    /// ERC-721 transfer.
    Erc721(Erc721TxArgs),
    /// Paraswap swap.
    Swap(SwapTxArgs),
    /// Username registration.
    EnsRegister(EnsRegisterTxArgs),
    /// Username release.
    EnsRelease(EnsReleaseTxArgs),
}

impl TransferArgs {
    /// Base arguments of whichever variant is present.
    #[must_use]
    pub fn base(&self) -> &SendTxArgs {
        match self {
            Self::Simple(base) | Self::Transfer(base) => base,
            Self::Hop(args) => &args.base,
            Self::Cbridge(args) => &args.base,
            Self::Erc721(args) => &args.base,
            Self::Swap(args) => &args.base,
            Self::EnsRegister(args) => &args.base,
            Self::EnsRelease(args) => &args.base,
        }
    }

    /// Mutable base arguments.
    pub fn base_mut(&mut self) -> &mut SendTxArgs {
        match self {
            Self::Simple(base) | Self::Transfer(base) => base,
            Self::Hop(args) => &mut args.base,
            Self::Cbridge(args) => &mut args.base,
            Self::Erc721(args) => &mut args.base,
            Self::Swap(args) => &mut args.base,
            Self::EnsRegister(args) => &mut args.base,
            Self::EnsRelease(args) => &mut args.base,
        }
    }

    /// Variant name, for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Simple(_) => "simple",
            Self::Transfer(_) => "transfer",
            Self::Hop(_) => "hop",
            Self::Cbridge(_) => "cbridge",
            Self::Erc721(_) => "erc721",
            Self::Swap(_) => "swap",
            Self::EnsRegister(_) => "ens_register",
            Self::EnsRelease(_) => "ens_release",
        }
    }
}

/// A transaction attempt on a given source chain.
///
/// Built fresh for every attempt and discarded after send or build.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBridge {
    /// Source chain ID.
    pub chain_id: u64,
    /// Strategy payload.
    pub args: TransferArgs,
}

impl TransactionBridge {
    /// Creates a transaction bridge.
    #[must_use]
    pub fn new(chain_id: u64, args: TransferArgs) -> Self {
        Self { chain_id, args }
    }

    /// Sending account.
    #[must_use]
    pub fn from(&self) -> Address {
        self.args.base().from
    }

    /// Transaction target.
    #[must_use]
    pub fn to(&self) -> Option<Address> {
        self.args.base().to
    }

    /// Native value, zero when unset.
    #[must_use]
    pub fn value(&self) -> U256 {
        self.args.base().value.unwrap_or_default()
    }

    /// Call data.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.args.base().data
    }
}
