//! # Router Configuration
//!
//! [`RouterConfig`] is read from an optional TOML file and then from
//! environment variables prefixed `BRIDGE_ROUTER` with `__` as the nesting
//! separator, for example `BRIDGE_ROUTER__HOP__API_URL`. A `.env` file is
//! loaded first when present.
//!
//! Every field has a default, so an empty source yields a working
//! configuration pointing at the public provider endpoints.
//!
//! # Examples
//!
//! ```
//! use bridge_router::config::RouterConfig;
//!
//! let config = RouterConfig::from_toml_str("gas_buffer_percent = 20").unwrap();
//! assert_eq!(config.gas_buffer_percent, 20);
//! assert_eq!(config.route_timeout_ms, 15_000);
//! ```

use crate::application::bridges::EnsDeployment;
use crate::domain::{Network, NetworkRegistry};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "BRIDGE_ROUTER";

/// Default ENS username registrar on mainnet.
pub const MAINNET_REGISTRAR: &str = "0xDB5ac1a559b02E12F29fC0eC0e37Be8E046DEF49";

/// Default registration payment token (SNT) on mainnet.
pub const MAINNET_SNT: &str = "0x744d70FDBE2Ba4CF95131626614a1763DF805B9E";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration sources could not be read or deserialized.
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    /// An address field is not a valid hex address.
    #[error("invalid address in {field}: {value}")]
    InvalidAddress {
        /// Field path.
        field: String,
        /// Rejected value.
        value: String,
    },

    /// The HTTP client for quote providers could not be built.
    #[error("http client error: {0}")]
    Http(String),
}

/// Top-level router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Timeout for quote provider requests.
    pub http_timeout_ms: u64,
    /// Budget for quoting a single bridge in the router.
    pub route_timeout_ms: u64,
    /// Safety buffer added to gas estimates, in percent.
    pub gas_buffer_percent: u64,
    /// Hop API.
    pub hop: HopSettings,
    /// Celer cBridge gateway.
    pub celer: CelerSettings,
    /// Paraswap API.
    pub paraswap: ParaswapSettings,
    /// Username registrar deployments.
    pub ens: Vec<EnsDeploymentConfig>,
    /// Known chains and their RPC endpoints.
    pub chains: Vec<ChainEndpoint>,
    /// Logging.
    pub log: LogSettings,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            http_timeout_ms: 10_000,
            route_timeout_ms: 15_000,
            gas_buffer_percent: 10,
            hop: HopSettings::default(),
            celer: CelerSettings::default(),
            paraswap: ParaswapSettings::default(),
            ens: vec![EnsDeploymentConfig {
                chain_id: crate::domain::network::ETHEREUM_MAINNET,
                registrar: MAINNET_REGISTRAR.to_string(),
                token: MAINNET_SNT.to_string(),
            }],
            chains: Network::well_known()
                .iter()
                .map(ChainEndpoint::from)
                .collect(),
            log: LogSettings::default(),
        }
    }
}

impl RouterConfig {
    /// Loads `.env`, the optional file at `path`, then the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or any source fails to
    /// deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        // A missing .env is not an error.
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has wrongly typed fields.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Parsed registrar deployments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] for a malformed address.
    pub fn ens_deployments(&self) -> Result<Vec<EnsDeployment>, ConfigError> {
        self.ens
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                Ok(EnsDeployment {
                    chain_id: entry.chain_id,
                    registrar: parse_address(&format!("ens[{}].registrar", i), &entry.registrar)?,
                    token: parse_address(&format!("ens[{}].token", i), &entry.token)?,
                })
            })
            .collect()
    }

    /// Networks described by [`chains`](Self::chains).
    #[must_use]
    pub fn network_registry(&self) -> NetworkRegistry {
        NetworkRegistry::new(self.chains.iter().map(ChainEndpoint::to_network))
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidAddress {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Hop API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HopSettings {
    /// Base URL.
    pub api_url: String,
}

impl Default for HopSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.hop.exchange".to_string(),
        }
    }
}

/// Celer gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CelerSettings {
    /// Gateway used for mainnets.
    pub prod_url: String,
    /// Gateway used for testnets.
    pub test_url: String,
}

impl Default for CelerSettings {
    fn default() -> Self {
        Self {
            prod_url: "https://cbridge-prod2.celer.app".to_string(),
            test_url: "https://cbridge-v2-test.celer.network".to_string(),
        }
    }
}

/// Paraswap settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParaswapSettings {
    /// Base URL.
    pub api_url: String,
    /// Partner tag sent with swap transactions.
    pub partner: Option<String>,
}

impl Default for ParaswapSettings {
    fn default() -> Self {
        Self {
            api_url: "https://apiv5.paraswap.io".to_string(),
            partner: None,
        }
    }
}

/// Registrar deployment as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsDeploymentConfig {
    /// Chain ID.
    pub chain_id: u64,
    /// Registrar address.
    pub registrar: String,
    /// Payment token address.
    pub token: String,
}

/// A chain and its RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEndpoint {
    /// Chain ID.
    pub chain_id: u64,
    /// Display name.
    pub name: String,
    /// JSON-RPC URL. Chains without one get no client.
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Testnet flag.
    #[serde(default)]
    pub is_test: bool,
    /// 1 for L1, 2 for rollups.
    #[serde(default = "default_layer")]
    pub layer: u8,
    /// Native asset symbol.
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
}

fn default_layer() -> u8 {
    1
}

fn default_native_symbol() -> String {
    "ETH".to_string()
}

impl ChainEndpoint {
    /// Creates an L1 mainnet endpoint without RPC URL.
    #[must_use]
    pub fn new(chain_id: u64, name: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
            rpc_url: None,
            is_test: false,
            layer: default_layer(),
            native_symbol: default_native_symbol(),
        }
    }

    /// Sets the RPC URL.
    #[must_use]
    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    /// Network descriptor of this chain.
    #[must_use]
    pub fn to_network(&self) -> Network {
        Network::new(self.chain_id, self.name.clone(), self.is_test, self.layer)
            .with_native_symbol(self.native_symbol.clone())
    }
}

impl From<&Network> for ChainEndpoint {
    fn from(network: &Network) -> Self {
        Self {
            chain_id: network.chain_id,
            name: network.name.clone(),
            rpc_url: None,
            is_test: network.is_test,
            layer: network.layer,
            native_symbol: network.native_symbol.clone(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of the human format.
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_yields_defaults() {
        let config = RouterConfig::from_toml_str("").unwrap();
        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.http_timeout_ms, 10_000);
        assert_eq!(config.gas_buffer_percent, 10);
        assert_eq!(config.hop.api_url, "https://api.hop.exchange");
        assert_eq!(config.chains.len(), 6);
        assert!(config.chains.iter().all(|c| c.rpc_url.is_none()));
    }

    #[test]
    fn default_ens_is_mainnet_registrar() {
        let deployments = RouterConfig::default().ens_deployments().unwrap();
        assert_eq!(deployments.len(), 1);
        assert_eq!(deployments[0].chain_id, 1);
        assert_eq!(deployments[0].registrar, MAINNET_REGISTRAR.parse::<Address>().unwrap());
        assert_eq!(deployments[0].token, MAINNET_SNT.parse::<Address>().unwrap());
    }

    #[test]
    fn nested_sections_override() {
        let config = RouterConfig::from_toml_str(
            r#"
            route_timeout_ms = 2000

            [paraswap]
            partner = "wallet"

            [log]
            json = true

            [[chains]]
            chain_id = 10
            name = "Optimism"
            rpc_url = "http://localhost:9545"
            layer = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.route_timeout_ms, 2000);
        assert_eq!(config.paraswap.partner.as_deref(), Some("wallet"));
        assert_eq!(config.paraswap.api_url, "https://apiv5.paraswap.io");
        assert!(config.log.json);
        assert_eq!(config.log.filter, "info");

        assert_eq!(config.chains.len(), 1);
        let network = config.network_registry().find(10).cloned().unwrap();
        assert_eq!(network.layer, 2);
        assert_eq!(network.native_symbol, "ETH");
        assert!(config.network_registry().find(1).is_none());
    }

    #[test]
    fn malformed_registrar_is_rejected() {
        let config = RouterConfig::from_toml_str(
            r#"
            [[ens]]
            chain_id = 11155111
            registrar = "0x1234"
            token = "0x744d70FDBE2Ba4CF95131626614a1763DF805B9E"
            "#,
        )
        .unwrap();

        let err = config.ens_deployments().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddress { ref field, .. } if field == "ens[0].registrar"));
    }

    #[test]
    fn wrongly_typed_field_fails() {
        assert!(RouterConfig::from_toml_str("http_timeout_ms = \"soon\"").is_err());
    }
}
