//! Prints a quote from every bridge able to carry a transfer.

use anyhow::{Context, Result, anyhow};
use bridge_router::config::RouterConfig;
use bridge_router::infrastructure::blockchain::ChainClients;
use bridge_router::telemetry::init_tracing;
use bridge_router::{BridgeParams, BridgeRouter, Token};
use clap::Parser;
use ethers::types::{Address, U256};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(name = "route-quote", about = "Quote every eligible bridge for a transfer")]
struct Cli {
    /// TOML configuration file
    #[clap(long)]
    config: Option<PathBuf>,

    /// Source chain ID
    #[clap(long, default_value_t = 1)]
    from_chain: u64,

    /// Destination chain ID
    #[clap(long)]
    to_chain: u64,

    /// Token symbol
    #[clap(long, default_value = "ETH")]
    token: String,

    /// Token contract on the source chain; omitted for the native asset
    #[clap(long)]
    token_address: Option<Address>,

    /// Token decimals
    #[clap(long, default_value_t = 18)]
    decimals: u8,

    /// Token bought, for swaps
    #[clap(long)]
    to_token: Option<String>,

    /// Decimals of the token bought
    #[clap(long, default_value_t = 18)]
    to_decimals: u8,

    /// Amount in base units
    #[clap(long)]
    amount: String,

    /// Sender
    #[clap(long)]
    from: Address,

    /// Recipient, defaults to the sender
    #[clap(long)]
    to: Option<Address>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = RouterConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(&config.log).map_err(|e| anyhow!("installing subscriber: {}", e))?;

    let networks = config.network_registry();
    let from_network = networks
        .find(cli.from_chain)
        .cloned()
        .ok_or_else(|| anyhow!("unknown chain {}", cli.from_chain))?;
    let to_network = networks
        .find(cli.to_chain)
        .cloned()
        .ok_or_else(|| anyhow!("unknown chain {}", cli.to_chain))?;

    let token = match cli.token_address {
        Some(address) => Token::erc20(&cli.token, cli.from_chain, address, cli.decimals),
        None if cli.token == from_network.native_symbol => Token::native(&cli.token, cli.from_chain),
        None => Token::unresolved(&cli.token, cli.from_chain, cli.decimals),
    };
    let amount = U256::from_dec_str(&cli.amount).context("parsing amount")?;

    let mut params = BridgeParams::new(
        from_network,
        to_network,
        cli.from,
        cli.to.unwrap_or(cli.from),
        token,
        amount,
    );
    if let Some(symbol) = &cli.to_token {
        params = params.with_to_token(Token::unresolved(symbol, cli.to_chain, cli.to_decimals));
    }

    let clients = ChainClients::from_endpoints(&config.chains).context("connecting to chains")?;
    let router = BridgeRouter::from_config(&config, clients)?;
    let routes = router.quote_routes(&params).await;

    if routes.quotes.is_empty() {
        println!("no route");
    }
    for quote in &routes.quotes {
        println!(
            "{:<16} amount_out={} fees={} gas={}",
            quote.bridge,
            quote.amount_out,
            quote.fees.total(),
            quote.gas
        );
    }
    for failure in &routes.failures {
        eprintln!("{}", failure);
    }
    Ok(())
}
