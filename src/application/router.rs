//! # Bridge Router
//!
//! Selects the bridges able to carry a transfer and quotes them concurrently.
//!
//! ```text
//! candidates ──► spawn per bridge ──► timeout(route_timeout)
//!                                      └─► fees ──► gas ──► amount out
//! ```
//!
//! Every bridge is quoted on its own fresh [`TransferAttempt`], so quotes
//! never leak between bridges or between calls. Failures are returned next
//! to the successful quotes instead of being dropped.

use crate::application::bridges::{
    Bridge, BridgeContext, CBridge, EnsRegisterBridge, EnsReleaseBridge, Erc721TransferBridge,
    FeeQuote, HopBridge, SimpleBridge, SwapParaswap, TransferAttempt, TransferBridge,
};
use crate::application::error::BridgeError;
use crate::application::nonce::NonceSequencer;
use crate::application::transactor::Transactor;
use crate::config::{ConfigError, RouterConfig};
use crate::domain::BridgeParams;
use crate::infrastructure::blockchain::{ChainClients, GasEstimator};
use crate::infrastructure::quotes::{CelerClient, HopClient, HttpClient, ParaswapClient};
use ethers::types::U256;
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Why a bridge produced no quote.
#[derive(Debug, Clone, Error)]
pub enum RouteError {
    /// The bridge returned an error.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// The bridge exceeded the route budget.
    #[error("route timed out")]
    TimedOut,

    /// The quoting task panicked.
    #[error("task panicked: {0}")]
    Panicked(String),
}

/// A bridge that was dropped from routing.
#[derive(Debug, Clone)]
pub struct RouteFailure {
    /// Bridge name.
    pub bridge: &'static str,
    /// What went wrong.
    pub error: RouteError,
}

impl fmt::Display for RouteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.bridge, self.error)
    }
}

/// A fully quoted route.
#[derive(Debug, Clone)]
pub struct RouteQuote {
    /// Bridge name.
    pub bridge: &'static str,
    /// Attempt carrying the provider quote, ready for `build_tx` or `send`.
    pub attempt: TransferAttempt,
    /// Fees charged by the bridge.
    pub fees: FeeQuote,
    /// Gas limit.
    pub gas: u64,
    /// Amount received.
    pub amount_out: U256,
}

/// Outcome of [`BridgeRouter::quote_routes`].
#[derive(Debug, Default)]
pub struct RouteQuotes {
    /// Quotes, highest amount out first.
    pub quotes: Vec<RouteQuote>,
    /// Bridges that were eligible but could not be quoted, and eligibility errors.
    pub failures: Vec<RouteFailure>,
}

impl RouteQuotes {
    /// Quote with the highest amount out.
    #[must_use]
    pub fn best(&self) -> Option<&RouteQuote> {
        self.quotes.first()
    }
}

/// Strategy router.
#[derive(Debug, Clone)]
pub struct BridgeRouter {
    bridges: Vec<Arc<dyn Bridge>>,
    route_timeout_ms: u64,
}

impl BridgeRouter {
    /// Default per-bridge quoting budget.
    pub const DEFAULT_ROUTE_TIMEOUT_MS: u64 = 15_000;

    /// Creates a router over explicit bridges.
    #[must_use]
    pub fn new(bridges: Vec<Arc<dyn Bridge>>) -> Self {
        Self {
            bridges,
            route_timeout_ms: Self::DEFAULT_ROUTE_TIMEOUT_MS,
        }
    }

    /// Sets the per-bridge quoting budget.
    #[must_use]
    pub fn with_route_timeout(mut self, timeout_ms: u64) -> Self {
        self.route_timeout_ms = timeout_ms;
        self
    }

    /// Builds every bridge from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or an ENS
    /// deployment address is malformed.
    pub fn from_config(config: &RouterConfig, clients: ChainClients) -> Result<Self, ConfigError> {
        let http = HttpClient::new(config.http_timeout_ms).map_err(|e| ConfigError::Http(e.to_string()))?;
        let ens = config.ens_deployments()?;

        let transactor = Transactor::new(
            clients,
            Arc::new(NonceSequencer::new()),
            GasEstimator::new(config.gas_buffer_percent),
        );
        let ctx = Arc::new(BridgeContext::new(transactor, config.network_registry()));

        let hop = Arc::new(HopClient::new(http.clone(), config.hop.api_url.clone()));
        let celer = Arc::new(CelerClient::new(
            http.clone(),
            config.celer.prod_url.clone(),
            config.celer.test_url.clone(),
        ));
        let paraswap = Arc::new(ParaswapClient::new(
            http,
            config.paraswap.api_url.clone(),
            config.paraswap.partner.clone(),
        ));

        let bridges: Vec<Arc<dyn Bridge>> = vec![
            Arc::new(SimpleBridge::new(Arc::clone(&ctx))),
            Arc::new(TransferBridge::new(Arc::clone(&ctx))),
            Arc::new(Erc721TransferBridge::new(Arc::clone(&ctx))),
            Arc::new(HopBridge::new(Arc::clone(&ctx), hop)),
            Arc::new(CBridge::new(Arc::clone(&ctx), celer)),
            Arc::new(SwapParaswap::new(Arc::clone(&ctx), paraswap)),
            Arc::new(EnsRegisterBridge::new(Arc::clone(&ctx), ens.clone())),
            Arc::new(EnsReleaseBridge::new(ctx, ens)),
        ];

        Ok(Self::new(bridges).with_route_timeout(config.route_timeout_ms))
    }

    /// Registered bridges.
    #[must_use]
    pub fn bridges(&self) -> &[Arc<dyn Bridge>] {
        &self.bridges
    }

    /// Bridge registered under `name`.
    #[must_use]
    pub fn bridge(&self, name: &str) -> Option<Arc<dyn Bridge>> {
        self.bridges.iter().find(|b| b.name() == name).cloned()
    }

    /// Bridges able to carry `params`.
    ///
    /// Eligibility errors come back as failures; bridges that simply cannot
    /// carry the transfer are left out of both lists.
    pub async fn candidates(&self, params: &BridgeParams) -> (Vec<Arc<dyn Bridge>>, Vec<RouteFailure>) {
        let checks = join_all(self.bridges.iter().map(|bridge| async move {
            (Arc::clone(bridge), bridge.available_for(params).await)
        }))
        .await;

        let mut eligible = Vec::new();
        let mut failures = Vec::new();
        for (bridge, result) in checks {
            match result {
                Ok(true) => eligible.push(bridge),
                Ok(false) => {}
                Err(error) => failures.push(RouteFailure {
                    bridge: bridge.name(),
                    error: error.into(),
                }),
            }
        }
        debug!(
            eligible = eligible.len(),
            failed = failures.len(),
            from_chain = params.from_network.chain_id,
            to_chain = params.to_network.chain_id,
            "route candidates"
        );
        (eligible, failures)
    }

    /// Quotes every eligible bridge concurrently.
    pub async fn quote_routes(&self, params: &BridgeParams) -> RouteQuotes {
        let (eligible, mut failures) = self.candidates(params).await;
        let budget = Duration::from_millis(self.route_timeout_ms);

        let handles: Vec<_> = eligible
            .into_iter()
            .map(|bridge| {
                let name = bridge.name();
                let params = params.clone();
                let handle = tokio::spawn(async move { timeout(budget, quote_route(bridge, params)).await });
                (name, handle)
            })
            .collect();

        let mut quotes = Vec::new();
        for (bridge, handle) in handles {
            let error = match handle.await {
                Ok(Ok(Ok(quote))) => {
                    quotes.push(quote);
                    continue;
                }
                Ok(Ok(Err(error))) => RouteError::Bridge(error),
                Ok(Err(_)) => RouteError::TimedOut,
                Err(e) => RouteError::Panicked(e.to_string()),
            };
            warn!(bridge, error = %error, "route dropped");
            failures.push(RouteFailure { bridge, error });
        }

        quotes.sort_by(|a, b| b.amount_out.cmp(&a.amount_out));
        RouteQuotes { quotes, failures }
    }
}

async fn quote_route(bridge: Arc<dyn Bridge>, params: BridgeParams) -> Result<RouteQuote, BridgeError> {
    let mut attempt = TransferAttempt::new(params);
    let fees = bridge.calculate_fees(&mut attempt).await?;
    let gas = bridge.estimate_gas(&mut attempt).await?;
    let amount_out = bridge.calculate_amount_out(&attempt).await?;
    debug!(bridge = bridge.name(), gas, %amount_out, "route quoted");
    Ok(RouteQuote {
        bridge: bridge.name(),
        attempt,
        fees,
        gas,
        amount_out,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::application::bridges::fixtures;
    use crate::application::error::BridgeResult;
    use crate::domain::{Network, SendTxArgs, Token, TransactionBridge, TransferArgs};
    use async_trait::async_trait;
    use ethers::types::Address;

    #[derive(Debug, Clone, Copy)]
    enum Behavior {
        Quote(u64),
        Ineligible,
        EligibilityError,
        FeeError,
        Slow,
        Panic,
    }

    #[derive(Debug)]
    struct StubBridge {
        name: &'static str,
        behavior: Behavior,
        ctx: BridgeContext,
    }

    fn stub(name: &'static str, behavior: Behavior) -> Arc<dyn Bridge> {
        Arc::new(StubBridge {
            name,
            behavior,
            ctx: fixtures::context(vec![]),
        })
    }

    #[async_trait]
    impl Bridge for StubBridge {
        fn name(&self) -> &'static str {
            self.name
        }

        fn context(&self) -> &BridgeContext {
            &self.ctx
        }

        async fn can(
            &self,
            _from: &Network,
            _to: &Network,
            _token: &Token,
            _to_token: Option<&Token>,
            _balance: U256,
        ) -> BridgeResult<bool> {
            match self.behavior {
                Behavior::Ineligible => Ok(false),
                Behavior::EligibilityError => Err(BridgeError::UnsupportedChain(1)),
                _ => Ok(true),
            }
        }

        async fn calculate_fees(&self, _attempt: &mut TransferAttempt) -> BridgeResult<FeeQuote> {
            match self.behavior {
                Behavior::FeeError => Err(BridgeError::QuoteMissing(self.name.to_string())),
                Behavior::Slow => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(FeeQuote::zero())
                }
                Behavior::Panic => panic!("stub panicked"),
                _ => Ok(FeeQuote {
                    base_fee: U256::zero(),
                    token_fee: U256::from(5u64),
                }),
            }
        }

        async fn estimate_gas(&self, _attempt: &mut TransferAttempt) -> BridgeResult<u64> {
            Ok(21_000)
        }

        async fn calculate_amount_out(&self, attempt: &TransferAttempt) -> BridgeResult<U256> {
            match self.behavior {
                Behavior::Quote(out) => Ok(U256::from(out)),
                _ => Ok(attempt.params.amount_in),
            }
        }

        async fn contract_address(&self, _network: &Network, _token: &Token) -> BridgeResult<Address> {
            Ok(Address::zero())
        }

        async fn prepare(&self, attempt: &TransferAttempt) -> BridgeResult<TransactionBridge> {
            Ok(TransactionBridge::new(
                attempt.params.from_network.chain_id,
                TransferArgs::Simple(attempt.base_args(attempt.params.to_address)),
            ))
        }

        async fn pack(&self, tx: &TransactionBridge) -> BridgeResult<SendTxArgs> {
            Ok(tx.args.base().clone())
        }
    }

    fn params() -> BridgeParams {
        fixtures::params(Network::ethereum(), Network::optimism(), fixtures::usdc(1), 1_000)
    }

    #[tokio::test]
    async fn candidates_keep_eligibility_errors() {
        let router = BridgeRouter::new(vec![
            stub("A", Behavior::Quote(900)),
            stub("B", Behavior::Ineligible),
            stub("C", Behavior::EligibilityError),
        ]);

        let (eligible, failures) = router.candidates(&params()).await;
        let names: Vec<_> = eligible.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["A"]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].bridge, "C");
        assert!(matches!(
            failures[0].error,
            RouteError::Bridge(BridgeError::UnsupportedChain(1))
        ));
    }

    #[tokio::test]
    async fn quotes_sorted_by_amount_out() {
        let router = BridgeRouter::new(vec![
            stub("Low", Behavior::Quote(900)),
            stub("High", Behavior::Quote(990)),
        ]);

        let routes = router.quote_routes(&params()).await;
        assert!(routes.failures.is_empty());
        let names: Vec<_> = routes.quotes.iter().map(|q| q.bridge).collect();
        assert_eq!(names, vec!["High", "Low"]);

        let best = routes.best().unwrap();
        assert_eq!(best.amount_out, U256::from(990u64));
        assert_eq!(best.gas, 21_000);
        assert_eq!(best.fees.total(), U256::from(5u64));
        assert_eq!(best.attempt.params.amount_in, U256::from(1_000u64));
    }

    #[tokio::test]
    async fn failing_bridges_reported() {
        let router = BridgeRouter::new(vec![
            stub("Ok", Behavior::Quote(950)),
            stub("Broken", Behavior::FeeError),
            stub("Slow", Behavior::Slow),
            stub("Panics", Behavior::Panic),
        ])
        .with_route_timeout(50);

        let routes = router.quote_routes(&params()).await;
        assert_eq!(routes.quotes.len(), 1);
        assert_eq!(routes.failures.len(), 3);

        let error_of = |name: &str| {
            routes
                .failures
                .iter()
                .find(|f| f.bridge == name)
                .map(|f| f.error.clone())
                .unwrap()
        };
        assert!(matches!(error_of("Broken"), RouteError::Bridge(BridgeError::QuoteMissing(_))));
        assert!(matches!(error_of("Slow"), RouteError::TimedOut));
        assert!(matches!(error_of("Panics"), RouteError::Panicked(_)));
    }

    #[tokio::test]
    async fn selects_by_name() {
        let router = BridgeRouter::new(vec![stub("A", Behavior::Quote(1)), stub("B", Behavior::Quote(2))]);
        assert_eq!(router.bridge("B").unwrap().name(), "B");
        assert!(router.bridge("Z").is_none());
    }

    #[tokio::test]
    async fn from_config_registers_every_bridge() {
        let router = BridgeRouter::from_config(&RouterConfig::default(), ChainClients::new()).unwrap();
        let names: Vec<_> = router.bridges().iter().map(|b| b.name()).collect();
        assert_eq!(
            names,
            vec![
                "Simple",
                "Transfer",
                "ERC721Transfer",
                "Hop",
                "CBridge",
                "Paraswap",
                "ENSRegister",
                "ENSRelease"
            ]
        );
    }
}
