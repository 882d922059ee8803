//! # Contract ABIs
//!
//! Human-readable signatures and typed encoders for ERC20, ERC721, the
//! username registrar and the Celer bridge.

use super::{ContractError, ContractResult, decode_output, encode_call};
use ethers::abi::Token as AbiToken;
use ethers::types::{Address, Bytes, U256};

/// ERC20 calls used for plain transfers.
pub const ERC20_ABI: &[&str] = &["function transfer(address to, uint256 amount) returns (bool)"];

/// ERC20 with `approveAndCall`, as implemented by the registrar payment token.
pub const APPROVE_AND_CALL_ABI: &[&str] = &[
    "function approveAndCall(address _spender, uint256 _amount, bytes _extraData) returns (bool)",
];

/// ERC721 safe transfer.
pub const ERC721_ABI: &[&str] =
    &["function safeTransferFrom(address from, address to, uint256 tokenId)"];

/// Username registrar.
pub const REGISTRAR_ABI: &[&str] = &[
    "function getPrice() view returns (uint256)",
    "function register(bytes32 _label, address _account, bytes32 _pubkeyA, bytes32 _pubkeyB) returns (bytes32)",
    "function release(bytes32 _label)",
];

/// Celer cBridge pool.
pub const CELER_BRIDGE_ABI: &[&str] = &[
    "function sendNative(address _receiver, uint256 _amount, uint64 _dstChainId, uint64 _nonce, uint32 _maxSlippage)",
    "function send(address _receiver, address _token, uint256 _amount, uint64 _dstChainId, uint64 _nonce, uint32 _maxSlippage)",
];

/// Packs `transfer(to, amount)`.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn erc20_transfer(to: Address, amount: U256) -> ContractResult<Bytes> {
    encode_call(
        ERC20_ABI,
        "transfer",
        &[AbiToken::Address(to), AbiToken::Uint(amount)],
    )
}

/// Packs `approveAndCall(spender, amount, extra_data)`.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn approve_and_call(spender: Address, amount: U256, extra_data: Bytes) -> ContractResult<Bytes> {
    encode_call(
        APPROVE_AND_CALL_ABI,
        "approveAndCall",
        &[
            AbiToken::Address(spender),
            AbiToken::Uint(amount),
            AbiToken::Bytes(extra_data.to_vec()),
        ],
    )
}

/// Packs `safeTransferFrom(from, to, token_id)`.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn erc721_safe_transfer_from(from: Address, to: Address, token_id: U256) -> ContractResult<Bytes> {
    encode_call(
        ERC721_ABI,
        "safeTransferFrom",
        &[
            AbiToken::Address(from),
            AbiToken::Address(to),
            AbiToken::Uint(token_id),
        ],
    )
}

/// Packs `getPrice()`.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn registrar_get_price() -> ContractResult<Bytes> {
    encode_call(REGISTRAR_ABI, "getPrice", &[])
}

/// Decodes the `getPrice()` return value.
///
/// # Errors
///
/// Returns an error if the data is not a single `uint256`.
pub fn decode_price(data: &[u8]) -> ContractResult<U256> {
    match decode_output(REGISTRAR_ABI, "getPrice", data)?.first() {
        Some(AbiToken::Uint(price)) => Ok(*price),
        _ => Err(ContractError::Decoding("getPrice returned no uint256".to_string())),
    }
}

/// Packs `register(label, account, pubkey_x, pubkey_y)`.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn registrar_register(
    label: [u8; 32],
    account: Address,
    pubkey_x: [u8; 32],
    pubkey_y: [u8; 32],
) -> ContractResult<Bytes> {
    encode_call(
        REGISTRAR_ABI,
        "register",
        &[
            AbiToken::FixedBytes(label.to_vec()),
            AbiToken::Address(account),
            AbiToken::FixedBytes(pubkey_x.to_vec()),
            AbiToken::FixedBytes(pubkey_y.to_vec()),
        ],
    )
}

/// Packs `release(label)`.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn registrar_release(label: [u8; 32]) -> ContractResult<Bytes> {
    encode_call(REGISTRAR_ABI, "release", &[AbiToken::FixedBytes(label.to_vec())])
}

/// Arguments shared by both Celer send entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CelerSend {
    /// Recipient on the destination chain.
    pub receiver: Address,
    /// Token to bridge; `None` for the native asset.
    pub token: Option<Address>,
    /// Amount to bridge.
    pub amount: U256,
    /// Destination chain ID.
    pub dst_chain_id: u64,
    /// Transfer nonce, unique per sender.
    pub nonce: u64,
    /// Maximum slippage in basis points.
    pub max_slippage: u32,
}

impl CelerSend {
    /// Packs `sendNative` for the native asset, `send` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode(&self) -> ContractResult<Bytes> {
        let tail = [
            AbiToken::Uint(U256::from(self.dst_chain_id)),
            AbiToken::Uint(U256::from(self.nonce)),
            AbiToken::Uint(U256::from(self.max_slippage)),
        ];
        match self.token {
            None => {
                let mut args = vec![AbiToken::Address(self.receiver), AbiToken::Uint(self.amount)];
                args.extend(tail);
                encode_call(CELER_BRIDGE_ABI, "sendNative", &args)
            }
            Some(token) => {
                let mut args = vec![
                    AbiToken::Address(self.receiver),
                    AbiToken::Address(token),
                    AbiToken::Uint(self.amount),
                ];
                args.extend(tail);
                encode_call(CELER_BRIDGE_ABI, "send", &args)
            }
        }
    }
}
