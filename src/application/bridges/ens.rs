//! # Username Registrar Bridges
//!
//! Registration and release of usernames on the registrar contract.
//!
//! Registration is a single transaction to the payment token:
//! `approveAndCall(registrar, price, register(label, account, x, y))`, so
//! paying and registering cannot be split. The price is read from the
//! registrar on every pack.

use super::{
    Bridge, BridgeContext, ENS_REGISTER_NAME, ENS_RELEASE_NAME, FeeQuote, TransferAttempt,
    wrong_payload,
};
use crate::application::error::{BridgeError, BridgeResult};
use crate::domain::network::{ETHEREUM_MAINNET, ETHEREUM_SEPOLIA};
use crate::domain::{
    EnsRegisterTxArgs, EnsReleaseTxArgs, Network, SendTxArgs, Token, TransactionBridge,
    TransferArgs,
};
use crate::infrastructure::blockchain::CallMsg;
use crate::infrastructure::contracts::abi::{
    approve_and_call, decode_price, registrar_get_price, registrar_register, registrar_release,
};
use async_trait::async_trait;
use ethers::types::{Address, Bytes, U256};
use ethers::utils::keccak256;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Chains the registrar is deployed on.
pub const REGISTRAR_CHAINS: [u64; 2] = [ETHEREUM_MAINNET, ETHEREUM_SEPOLIA];

/// Registrar and payment token on one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsDeployment {
    /// Chain ID.
    pub chain_id: u64,
    /// Username registrar.
    pub registrar: Address,
    /// ERC20 the registration price is paid in.
    pub token: Address,
}

/// Registrar label of `username`.
#[must_use]
pub fn username_label(username: &str) -> [u8; 32] {
    keccak256(username.as_bytes())
}

/// Splits an uncompressed public key `0x04 || X || Y` into its coordinates.
///
/// # Errors
///
/// Returns [`BridgeError::InvalidParams`] for anything else.
pub fn split_public_key(public_key: &str) -> BridgeResult<([u8; 32], [u8; 32])> {
    let bytes: Bytes = public_key
        .parse()
        .map_err(|_| BridgeError::invalid_params("public key is not hex"))?;
    let invalid = || BridgeError::invalid_params("public key must be 0x04 followed by X and Y");
    if bytes.len() != 65 || bytes.first() != Some(&0x04) {
        return Err(invalid());
    }
    let x = bytes.get(1..33).and_then(|s| <[u8; 32]>::try_from(s).ok()).ok_or_else(invalid)?;
    let y = bytes.get(33..65).and_then(|s| <[u8; 32]>::try_from(s).ok()).ok_or_else(invalid)?;
    Ok((x, y))
}

fn deployment_for(deployments: &[EnsDeployment], bridge: &str, chain_id: u64) -> BridgeResult<EnsDeployment> {
    deployments
        .iter()
        .find(|d| d.chain_id == chain_id)
        .copied()
        .ok_or_else(|| BridgeError::contract_not_found(bridge, "registrar", chain_id))
}

fn on_registrar_chain(from: &Network, to: &Network) -> bool {
    from.chain_id == to.chain_id && REGISTRAR_CHAINS.contains(&from.chain_id)
}

fn username(attempt: &TransferAttempt) -> BridgeResult<String> {
    attempt
        .params
        .username
        .clone()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| BridgeError::invalid_params("username is required"))
}

/// Username registration.
#[derive(Debug, Clone)]
pub struct EnsRegisterBridge {
    ctx: Arc<BridgeContext>,
    deployments: Vec<EnsDeployment>,
}

impl EnsRegisterBridge {
    /// Creates the bridge over the given deployments.
    #[must_use]
    pub fn new(ctx: Arc<BridgeContext>, deployments: Vec<EnsDeployment>) -> Self {
        Self { ctx, deployments }
    }

    async fn price(&self, chain_id: u64, from: Address, registrar: Address) -> BridgeResult<U256> {
        let client = self.ctx.client(chain_id)?;
        let msg = CallMsg::new(from, registrar).with_data(registrar_get_price()?);
        let price = decode_price(&client.call(&msg).await?)?;
        debug!(chain_id, %price, "registrar price");
        Ok(price)
    }
}

#[async_trait]
impl Bridge for EnsRegisterBridge {
    fn name(&self) -> &'static str {
        ENS_REGISTER_NAME
    }

    fn context(&self) -> &BridgeContext {
        &self.ctx
    }

    async fn can(
        &self,
        from: &Network,
        to: &Network,
        _token: &Token,
        _to_token: Option<&Token>,
        _balance: U256,
    ) -> BridgeResult<bool> {
        Ok(on_registrar_chain(from, to))
    }

    async fn calculate_fees(&self, _attempt: &mut TransferAttempt) -> BridgeResult<FeeQuote> {
        Ok(FeeQuote::zero())
    }

    async fn estimate_gas(&self, attempt: &mut TransferAttempt) -> BridgeResult<u64> {
        let tx = self.prepare(attempt).await?;
        let args = self.pack(&tx).await?;
        self.ctx.buffered_estimate(tx.chain_id, &args).await
    }

    async fn calculate_amount_out(&self, attempt: &TransferAttempt) -> BridgeResult<U256> {
        Ok(attempt.params.amount_in)
    }

    async fn contract_address(&self, network: &Network, _token: &Token) -> BridgeResult<Address> {
        deployment_for(&self.deployments, ENS_REGISTER_NAME, network.chain_id).map(|d| d.registrar)
    }

    async fn prepare(&self, attempt: &TransferAttempt) -> BridgeResult<TransactionBridge> {
        let chain_id = attempt.params.from_network.chain_id;
        let deployment = deployment_for(&self.deployments, ENS_REGISTER_NAME, chain_id)?;
        let public_key = attempt
            .params
            .public_key
            .clone()
            .ok_or_else(|| BridgeError::invalid_params("public key is required"))?;
        Ok(TransactionBridge::new(
            chain_id,
            TransferArgs::EnsRegister(EnsRegisterTxArgs {
                base: attempt.base_args(deployment.token),
                username: username(attempt)?,
                public_key,
            }),
        ))
    }

    async fn pack(&self, tx: &TransactionBridge) -> BridgeResult<SendTxArgs> {
        let TransferArgs::EnsRegister(args) = &tx.args else {
            return Err(wrong_payload(ENS_REGISTER_NAME, tx));
        };
        let deployment = deployment_for(&self.deployments, ENS_REGISTER_NAME, tx.chain_id)?;
        let (x, y) = split_public_key(&args.public_key)?;
        let register = registrar_register(username_label(&args.username), args.base.from, x, y)?;
        let price = self.price(tx.chain_id, args.base.from, deployment.registrar).await?;

        let mut base = args.base.clone();
        base.to = Some(deployment.token);
        base.value = Some(U256::zero());
        base.data = approve_and_call(deployment.registrar, price, register)?;
        Ok(base)
    }
}

/// Username release.
#[derive(Debug, Clone)]
pub struct EnsReleaseBridge {
    ctx: Arc<BridgeContext>,
    deployments: Vec<EnsDeployment>,
}

impl EnsReleaseBridge {
    /// Creates the bridge over the given deployments.
    #[must_use]
    pub fn new(ctx: Arc<BridgeContext>, deployments: Vec<EnsDeployment>) -> Self {
        Self { ctx, deployments }
    }
}

#[async_trait]
impl Bridge for EnsReleaseBridge {
    fn name(&self) -> &'static str {
        ENS_RELEASE_NAME
    }

    fn context(&self) -> &BridgeContext {
        &self.ctx
    }

    async fn can(
        &self,
        from: &Network,
        to: &Network,
        _token: &Token,
        _to_token: Option<&Token>,
        _balance: U256,
    ) -> BridgeResult<bool> {
        Ok(on_registrar_chain(from, to))
    }

    async fn calculate_fees(&self, _attempt: &mut TransferAttempt) -> BridgeResult<FeeQuote> {
        Ok(FeeQuote::zero())
    }

    async fn estimate_gas(&self, attempt: &mut TransferAttempt) -> BridgeResult<u64> {
        let tx = self.prepare(attempt).await?;
        let args = self.pack(&tx).await?;
        self.ctx.buffered_estimate(tx.chain_id, &args).await
    }

    async fn calculate_amount_out(&self, attempt: &TransferAttempt) -> BridgeResult<U256> {
        Ok(attempt.params.amount_in)
    }

    async fn contract_address(&self, network: &Network, _token: &Token) -> BridgeResult<Address> {
        deployment_for(&self.deployments, ENS_RELEASE_NAME, network.chain_id).map(|d| d.registrar)
    }

    async fn prepare(&self, attempt: &TransferAttempt) -> BridgeResult<TransactionBridge> {
        let chain_id = attempt.params.from_network.chain_id;
        let deployment = deployment_for(&self.deployments, ENS_RELEASE_NAME, chain_id)?;
        Ok(TransactionBridge::new(
            chain_id,
            TransferArgs::EnsRelease(EnsReleaseTxArgs {
                base: attempt.base_args(deployment.registrar),
                username: username(attempt)?,
            }),
        ))
    }

    async fn pack(&self, tx: &TransactionBridge) -> BridgeResult<SendTxArgs> {
        let TransferArgs::EnsRelease(args) = &tx.args else {
            return Err(wrong_payload(ENS_RELEASE_NAME, tx));
        };
        let deployment = deployment_for(&self.deployments, ENS_RELEASE_NAME, tx.chain_id)?;
        let mut base = args.base.clone();
        base.to = Some(deployment.registrar);
        base.value = Some(U256::zero());
        base.data = registrar_release(username_label(&args.username))?;
        Ok(base)
    }
}
