//! # Hop Protocol Contracts
//!
//! Deployment addresses and the ABI routing table for Hop bridges.
//!
//! A transfer is encoded in two lookups:
//!
//! 1. [`contract_address`] picks the deployment and its [`HopContractRole`]
//!    from `(source chain, symbol)`.
//! 2. [`select_abi`] maps `(role, chain family, token kind)` to a [`HopAbi`]
//!    through the [`ABI_ROUTES`] table.
//!
//! Adding an L2 means adding rows, not branches.

use super::{ContractError, ContractResult, decode_call, encode_call};
use crate::domain::network::{
    ARBITRUM_MAINNET, ARBITRUM_SEPOLIA, ETHEREUM_MAINNET, ETHEREUM_SEPOLIA, OPTIMISM_MAINNET,
    OPTIMISM_SEPOLIA,
};
use crate::domain::{BonderFee, Token};
use ethers::abi::Token as AbiToken;
use ethers::types::{Address, Bytes, U256};
use std::fmt;

/// Symbol of the protocol's own governance token.
pub const HOP_SYMBOL: &str = "HOP";

/// Deadline used when a transfer is built without a quote (7 days).
pub const FALLBACK_DEADLINE_SECS: i64 = 604_800;

/// Role a deployed contract plays in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HopContractRole {
    /// Canonical L1 bridge.
    L1Bridge,
    /// L1 side of the CCTP implementation.
    CctpL1Bridge,
    /// L2 bridge, sends hTokens without swapping.
    L2Bridge,
    /// L2 wrapper that swaps through the AMM before sending.
    L2AmmWrapper,
    /// L2 side of the CCTP implementation.
    CctpL2Bridge,
}

impl fmt::Display for HopContractRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::L1Bridge => "l1Bridge",
            Self::CctpL1Bridge => "cctpL1Bridge",
            Self::L2Bridge => "l2Bridge",
            Self::L2AmmWrapper => "l2AmmWrapper",
            Self::CctpL2Bridge => "cctpL2Bridge",
        };
        f.write_str(name)
    }
}

/// Groups of chains sharing a bridge implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFamily {
    /// Optimism mainnet and testnets.
    Optimism,
    /// Arbitrum mainnet and testnets.
    Arbitrum,
}

impl ChainFamily {
    /// Returns the family of `chain_id`, if it has one.
    #[must_use]
    pub const fn of(chain_id: u64) -> Option<Self> {
        match chain_id {
            OPTIMISM_MAINNET | OPTIMISM_SEPOLIA => Some(Self::Optimism),
            ARBITRUM_MAINNET | ARBITRUM_SEPOLIA => Some(Self::Arbitrum),
            _ => None,
        }
    }
}

/// How the bridged asset is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Native gas asset.
    Native,
    /// The HOP governance token.
    Governance,
    /// Any other ERC20.
    Erc20,
}

impl TokenKind {
    /// Classifies a token.
    #[must_use]
    pub fn of(token: &Token) -> Self {
        if token.is_native() {
            Self::Native
        } else if token.symbol == HOP_SYMBOL {
            Self::Governance
        } else {
            Self::Erc20
        }
    }
}

/// Wire encoding of a Hop send call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HopAbi {
    /// L1 CCTP implementation.
    CctpL1,
    /// L1 ETH bridge.
    L1Eth,
    /// L1 ERC20 bridge.
    L1Erc20,
    /// L1 HOP token bridge.
    L1Hop,
    /// L2 AMM wrapper.
    L2AmmWrapper,
    /// L2 CCTP implementation.
    CctpL2,
    /// L2 bridge on Optimism chains.
    L2Optimism,
    /// L2 bridge on Arbitrum chains.
    L2Arbitrum,
}

const CCTP_SEND: &str =
    "function send(uint256 chainId, address recipient, uint256 amount, uint256 bonderFee)";
const L1_SEND_TO_L2: &str = "function sendToL2(uint256 chainId, address recipient, uint256 amount, uint256 amountOutMin, uint256 deadline, address relayer, uint256 relayerFee)";
const L2_SWAP_AND_SEND: &str = "function swapAndSend(uint256 chainId, address recipient, uint256 amount, uint256 bonderFee, uint256 amountOutMin, uint256 deadline, uint256 destinationAmountOutMin, uint256 destinationDeadline)";
const L2_SEND: &str = "function send(uint256 chainId, address recipient, uint256 amount, uint256 bonderFee, uint256 amountOutMin, uint256 deadline)";

impl HopAbi {
    /// Human-readable signature of the send entry point.
    #[must_use]
    pub const fn signature(self) -> &'static str {
        match self {
            Self::CctpL1 | Self::CctpL2 => CCTP_SEND,
            Self::L1Eth | Self::L1Erc20 | Self::L1Hop => L1_SEND_TO_L2,
            Self::L2AmmWrapper => L2_SWAP_AND_SEND,
            Self::L2Optimism | Self::L2Arbitrum => L2_SEND,
        }
    }

    /// Method name of the send entry point.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::CctpL1 | Self::CctpL2 | Self::L2Optimism | Self::L2Arbitrum => "send",
            Self::L1Eth | Self::L1Erc20 | Self::L1Hop => "sendToL2",
            Self::L2AmmWrapper => "swapAndSend",
        }
    }
}

/// One row of the ABI routing table. `None` matches anything.
#[derive(Debug, Clone, Copy)]
pub struct AbiRoute {
    /// Contract role.
    pub role: HopContractRole,
    /// Chain family of the source chain.
    pub family: Option<ChainFamily>,
    /// Kind of the token sent.
    pub kind: Option<TokenKind>,
    /// Selected encoding.
    pub abi: HopAbi,
}

impl AbiRoute {
    fn matches(&self, role: HopContractRole, family: Option<ChainFamily>, kind: TokenKind) -> bool {
        self.role == role
            && self.family.is_none_or(|f| Some(f) == family)
            && self.kind.is_none_or(|k| k == kind)
    }
}

/// `(role, chain family, token kind) -> abi`, first match wins.
pub const ABI_ROUTES: &[AbiRoute] = &[
    AbiRoute { role: HopContractRole::CctpL1Bridge, family: None, kind: None, abi: HopAbi::CctpL1 },
    AbiRoute { role: HopContractRole::CctpL2Bridge, family: None, kind: None, abi: HopAbi::CctpL2 },
    AbiRoute { role: HopContractRole::L1Bridge, family: None, kind: Some(TokenKind::Native), abi: HopAbi::L1Eth },
    AbiRoute { role: HopContractRole::L1Bridge, family: None, kind: Some(TokenKind::Governance), abi: HopAbi::L1Hop },
    AbiRoute { role: HopContractRole::L1Bridge, family: None, kind: Some(TokenKind::Erc20), abi: HopAbi::L1Erc20 },
    AbiRoute { role: HopContractRole::L2AmmWrapper, family: None, kind: None, abi: HopAbi::L2AmmWrapper },
    AbiRoute { role: HopContractRole::L2Bridge, family: Some(ChainFamily::Optimism), kind: None, abi: HopAbi::L2Optimism },
    AbiRoute { role: HopContractRole::L2Bridge, family: Some(ChainFamily::Arbitrum), kind: None, abi: HopAbi::L2Arbitrum },
];

/// Selects the ABI for a contract role on a chain.
///
/// # Errors
///
/// Returns [`ContractError::Unsupported`] if no route matches, e.g. an
/// L2 bridge on a chain outside the known families.
pub fn select_abi(role: HopContractRole, chain_id: u64, token: &Token) -> ContractResult<HopAbi> {
    let family = ChainFamily::of(chain_id);
    let kind = TokenKind::of(token);
    ABI_ROUTES
        .iter()
        .find(|route| route.matches(role, family, kind))
        .map(|route| route.abi)
        .ok_or_else(|| {
            ContractError::Unsupported(format!(
                "no hop abi for {} on chain {} ({})",
                role, chain_id, token.symbol
            ))
        })
}

/// `(symbol, chain, role, address)` rows from the Hop SDK address book.
const DEPLOYMENTS: &[(&str, u64, HopContractRole, &str)] = &[
    ("USDC", ETHEREUM_MAINNET, HopContractRole::CctpL1Bridge, "0x7e77461CA2a9d82d26FD5e0Da2243BF72eA45747"),
    ("USDC", OPTIMISM_MAINNET, HopContractRole::CctpL2Bridge, "0x469147af8Bde580232BE9DC84Bb4EC84d348De24"),
    ("USDC", ARBITRUM_MAINNET, HopContractRole::CctpL2Bridge, "0x6504BFcaB789c35325cA4329f1f41FaC340bf982"),
    ("USDC", ETHEREUM_SEPOLIA, HopContractRole::CctpL1Bridge, "0x05fda2db623fa6a89a2db33550848ab2006a4427"),
    ("USDC", OPTIMISM_SEPOLIA, HopContractRole::CctpL2Bridge, "0x9f3B8679c73C2Fef8b59B4f3444d4e156fb70AA5"),
    ("USDC", ARBITRUM_SEPOLIA, HopContractRole::CctpL2Bridge, "0x9f3B8679c73C2Fef8b59B4f3444d4e156fb70AA5"),
    ("USDC.e", ETHEREUM_MAINNET, HopContractRole::L1Bridge, "0x3666f603Cc164936C1b87e207F36BEBa4AC5f18a"),
    ("USDC.e", OPTIMISM_MAINNET, HopContractRole::L2Bridge, "0xa81D244A1814468C734E5b4101F7b9c0c577a8fC"),
    ("USDC.e", OPTIMISM_MAINNET, HopContractRole::L2AmmWrapper, "0x2ad09850b0CA4c7c1B33f5AcD6cBAbCaB5d6e796"),
    ("USDC.e", ARBITRUM_MAINNET, HopContractRole::L2Bridge, "0x0e0E3d2C5c292161999474247956EF542caBF8dd"),
    ("USDC.e", ARBITRUM_MAINNET, HopContractRole::L2AmmWrapper, "0xe22D2beDb3Eca35E6397e0C6D62857094aA26F52"),
    ("USDT", ETHEREUM_MAINNET, HopContractRole::L1Bridge, "0x3E4a3a4796d16c0Cd582C382691998f7c06420B6"),
    ("USDT", OPTIMISM_MAINNET, HopContractRole::L2Bridge, "0x46ae9BaB8CEA96610807a275EBD36f8e916b5C61"),
    ("USDT", OPTIMISM_MAINNET, HopContractRole::L2AmmWrapper, "0x7D269D3E0d61A05a0bA976b7DBF8805bF844AF3F"),
    ("USDT", ARBITRUM_MAINNET, HopContractRole::L2Bridge, "0x72209Fe68386b37A40d6bCA04f78356fd342491f"),
    ("USDT", ARBITRUM_MAINNET, HopContractRole::L2AmmWrapper, "0xCB0a4177E0A60247C0ad18Be87f8eDfF6DD30283"),
    ("DAI", ETHEREUM_MAINNET, HopContractRole::L1Bridge, "0x3d4Cc8A61c7528Fd86C55cfe061a78dCBA48EDd1"),
    ("DAI", OPTIMISM_MAINNET, HopContractRole::L2Bridge, "0x7191061D5d4C60f598214cC6913502184BAddf18"),
    ("DAI", OPTIMISM_MAINNET, HopContractRole::L2AmmWrapper, "0xb3C68a491608952Cb1257FC9909a537a0173b63B"),
    ("DAI", ARBITRUM_MAINNET, HopContractRole::L2Bridge, "0x7aC115536FE3A185100B2c4DE4cb328bf3A58Ba6"),
    ("DAI", ARBITRUM_MAINNET, HopContractRole::L2AmmWrapper, "0xe7F40BF16AB09f4a6906Ac2CAA4094aD2dA48Cc2"),
    ("ETH", ETHEREUM_MAINNET, HopContractRole::L1Bridge, "0xb8901acB165ed027E32754E0FFe830802919727f"),
    ("ETH", OPTIMISM_MAINNET, HopContractRole::L2Bridge, "0x83f6244Bd87662118d96D9a6D44f09dffF14b30E"),
    ("ETH", OPTIMISM_MAINNET, HopContractRole::L2AmmWrapper, "0x86cA30bEF97fB651b8d866D45503684b90cb3312"),
    ("ETH", ARBITRUM_MAINNET, HopContractRole::L2Bridge, "0x3749C4f034022c39ecafFaBA182555d4508caCCC"),
    ("ETH", ARBITRUM_MAINNET, HopContractRole::L2AmmWrapper, "0x33ceb27b39d2Bb7D2e61F7564d3Df29344020417"),
    ("HOP", ETHEREUM_MAINNET, HopContractRole::L1Bridge, "0x914f986a44AcB623A277d6Bd17368171FCbe4273"),
    ("HOP", OPTIMISM_MAINNET, HopContractRole::L2Bridge, "0x03D7f750777eC48d39D080b020D83Eb2CB4e3547"),
    ("HOP", ARBITRUM_MAINNET, HopContractRole::L2Bridge, "0x25FB92E505F752F730cAD0Bd4fa17ecE4A384266"),
];

/// Role used to send `symbol` from `chain_id`.
#[must_use]
pub fn role_for(chain_id: u64, symbol: &str) -> HopContractRole {
    let is_l1 = matches!(chain_id, ETHEREUM_MAINNET | ETHEREUM_SEPOLIA);
    match (is_l1, symbol) {
        (true, "USDC") => HopContractRole::CctpL1Bridge,
        (true, _) => HopContractRole::L1Bridge,
        (false, "USDC") => HopContractRole::CctpL2Bridge,
        (false, HOP_SYMBOL) => HopContractRole::L2Bridge,
        (false, _) => HopContractRole::L2AmmWrapper,
    }
}

/// Finds the contract to send `symbol` from `chain_id`, with its role.
#[must_use]
pub fn contract_address(chain_id: u64, symbol: &str) -> Option<(Address, HopContractRole)> {
    let role = role_for(chain_id, symbol);
    DEPLOYMENTS
        .iter()
        .find(|(s, chain, r, _)| *s == symbol && *chain == chain_id && *r == role)
        .and_then(|(_, _, _, address)| address.parse::<Address>().ok())
        .map(|address| (address, role))
}

/// Values packed into a Hop send call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopSendValues {
    /// Amount sent.
    pub amount_in: U256,
    /// Fee paid to the bonder.
    pub bonder_fee: U256,
    /// Minimum out of the source chain AMM swap.
    pub amount_out_min: U256,
    /// Unix deadline of the source chain swap.
    pub deadline: i64,
    /// Minimum out of the destination chain AMM swap; zero towards L1.
    pub destination_amount_out_min: U256,
    /// Unix deadline of the destination chain swap; zero towards L1.
    pub destination_deadline: i64,
}

impl HopSendValues {
    /// Takes every value from a provider quote.
    #[must_use]
    pub fn from_quote(quote: &BonderFee) -> Self {
        Self {
            amount_in: quote.amount_in,
            bonder_fee: quote.bonder_fee,
            amount_out_min: quote.amount_out_min,
            deadline: quote.deadline,
            destination_amount_out_min: quote.destination_amount_out_min,
            destination_deadline: quote.destination_deadline,
        }
    }

    /// Values for a transfer built without a quote: no minimum out and a
    /// seven day deadline from `now`.
    ///
    /// L1 has no AMM, so a transfer towards L1 carries no destination
    /// deadline. A non-zero one yields a transfer ID the bonder rejects.
    #[must_use]
    pub fn without_quote(amount: U256, bonder_fee: U256, now: i64, to_l1: bool) -> Self {
        let deadline = now.saturating_add(FALLBACK_DEADLINE_SECS);
        Self {
            amount_in: amount,
            bonder_fee,
            amount_out_min: U256::zero(),
            deadline,
            destination_amount_out_min: U256::zero(),
            destination_deadline: if to_l1 { 0 } else { deadline },
        }
    }
}

fn uint_from_secs(field: &str, secs: i64) -> ContractResult<AbiToken> {
    u64::try_from(secs)
        .map(|secs| AbiToken::Uint(U256::from(secs)))
        .map_err(|_| ContractError::Encoding(format!("{} is negative: {}", field, secs)))
}

/// Encodes the send call of `abi` towards `to_chain_id`.
///
/// # Errors
///
/// Returns an error if the arguments cannot be encoded, including a
/// negative deadline.
pub fn encode_send(
    abi: HopAbi,
    to_chain_id: u64,
    recipient: Address,
    values: &HopSendValues,
) -> ContractResult<Bytes> {
    let chain = AbiToken::Uint(U256::from(to_chain_id));
    let recipient = AbiToken::Address(recipient);
    let amount = AbiToken::Uint(values.amount_in);
    let bonder_fee = AbiToken::Uint(values.bonder_fee);
    let amount_out_min = AbiToken::Uint(values.amount_out_min);
    let deadline = uint_from_secs("deadline", values.deadline)?;

    let args = match abi {
        HopAbi::CctpL1 | HopAbi::CctpL2 => vec![chain, recipient, amount, bonder_fee],
        HopAbi::L1Eth | HopAbi::L1Erc20 | HopAbi::L1Hop => vec![
            chain,
            recipient,
            amount,
            amount_out_min,
            deadline,
            AbiToken::Address(Address::zero()),
            AbiToken::Uint(U256::zero()),
        ],
        HopAbi::L2AmmWrapper => vec![
            chain,
            recipient,
            amount,
            bonder_fee,
            amount_out_min,
            deadline,
            AbiToken::Uint(values.destination_amount_out_min),
            uint_from_secs("destinationDeadline", values.destination_deadline)?,
        ],
        HopAbi::L2Optimism | HopAbi::L2Arbitrum => {
            vec![chain, recipient, amount, bonder_fee, amount_out_min, deadline]
        }
    };
    encode_call(&[abi.signature()], abi.method(), &args)
}

/// Logical fields recovered from encoded send call data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedSend {
    /// Destination chain ID.
    pub to_chain_id: U256,
    /// Recipient on the destination chain.
    pub recipient: Address,
    /// Amount sent.
    pub amount: U256,
    /// Absent for L1 bridges, which take no bonder fee.
    pub bonder_fee: Option<U256>,
}

/// Decodes call data produced by [`encode_send`].
///
/// # Errors
///
/// Returns [`ContractError::Decoding`] if the data does not match `abi`.
pub fn decode_send(abi: HopAbi, data: &[u8]) -> ContractResult<DecodedSend> {
    let tokens = decode_call(&[abi.signature()], abi.method(), data)?;
    let uint = |index: usize| match tokens.get(index) {
        Some(AbiToken::Uint(value)) => Ok(*value),
        _ => Err(ContractError::Decoding(format!("argument {} is not a uint", index))),
    };
    let recipient = match tokens.get(1) {
        Some(AbiToken::Address(address)) => *address,
        _ => return Err(ContractError::Decoding("argument 1 is not an address".to_string())),
    };
    let bonder_fee = match abi {
        HopAbi::L1Eth | HopAbi::L1Erc20 | HopAbi::L1Hop => None,
        _ => Some(uint(3)?),
    };
    Ok(DecodedSend {
        to_chain_id: uint(0)?,
        recipient,
        amount: uint(2)?,
        bonder_fee,
    })
}
