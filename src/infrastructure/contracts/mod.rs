//! # Contract Encoding
//!
//! Human-readable ABIs for every contract the bridges touch, plus the Hop
//! deployment table and ABI routing.
//!
//! Call data is produced with `ethers::abi`; no generated bindings are used.

pub mod abi;
pub mod hop;

use ethers::abi::{Abi, Function, Token as AbiToken, parse_abi};
use ethers::types::Bytes;
use thiserror::Error;

/// Error type for ABI parsing, encoding and decoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContractError {
    /// A human-readable ABI failed to parse.
    #[error("invalid abi: {0}")]
    InvalidAbi(String),

    /// The ABI has no function with the requested name.
    #[error("method not found in abi: {0}")]
    MethodNotFound(String),

    /// Arguments did not match the function inputs.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Call data or return data could not be decoded.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// No encoding exists for the requested deployment.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Result type for contract encoding.
pub type ContractResult<T> = Result<T, ContractError>;

/// Parses a set of human-readable signatures.
///
/// # Errors
///
/// Returns [`ContractError::InvalidAbi`] if a signature is malformed.
pub fn load_abi(signatures: &[&str]) -> ContractResult<Abi> {
    parse_abi(signatures).map_err(|e| ContractError::InvalidAbi(e.to_string()))
}

/// Looks up a function by name.
///
/// # Errors
///
/// Returns [`ContractError::MethodNotFound`] if the ABI lacks `method`.
pub fn function<'a>(abi: &'a Abi, method: &str) -> ContractResult<&'a Function> {
    abi.function(method)
        .map_err(|_| ContractError::MethodNotFound(method.to_string()))
}

/// Encodes a call of `method` with `args`, selector included.
///
/// # Errors
///
/// Returns an error if the ABI is malformed, the method is missing, or the
/// arguments do not match its inputs.
pub fn encode_call(signatures: &[&str], method: &str, args: &[AbiToken]) -> ContractResult<Bytes> {
    let abi = load_abi(signatures)?;
    function(&abi, method)?
        .encode_input(args)
        .map(Bytes::from)
        .map_err(|e| ContractError::Encoding(format!("{}: {}", method, e)))
}

/// Decodes call data of `method`, checking the selector.
///
/// # Errors
///
/// Returns [`ContractError::Decoding`] if the selector differs or the
/// payload does not match the inputs.
pub fn decode_call(signatures: &[&str], method: &str, data: &[u8]) -> ContractResult<Vec<AbiToken>> {
    let abi = load_abi(signatures)?;
    let function = function(&abi, method)?;
    let (selector, payload) = data
        .split_at_checked(4)
        .ok_or_else(|| ContractError::Decoding("call data shorter than selector".to_string()))?;
    if selector != function.short_signature().as_slice() {
        return Err(ContractError::Decoding(format!(
            "selector does not match {}",
            method
        )));
    }
    function
        .decode_input(payload)
        .map_err(|e| ContractError::Decoding(e.to_string()))
}

/// Decodes the return data of `method`.
///
/// # Errors
///
/// Returns [`ContractError::Decoding`] if the output does not match.
pub fn decode_output(signatures: &[&str], method: &str, data: &[u8]) -> ContractResult<Vec<AbiToken>> {
    let abi = load_abi(signatures)?;
    function(&abi, method)?
        .decode_output(data)
        .map_err(|e| ContractError::Decoding(e.to_string()))
}
