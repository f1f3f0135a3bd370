//! Arbitrage Signal Bridge CLI
//!
//! Command-line interface for supervising the monitor process and firing
//! one-shot demo trades.

use bnb_arb_bridge::config::{BridgeConfig, Network};
use bnb_arb_bridge::wallet::SecureWallet;
use bnb_arb_bridge::{ArbExecutor, Bridge, Error, ExecutionGate, Result, Signal, TradeOutcome};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "arb-bridge")]
#[command(about = "Signal bridge between the arbitrage monitor and BSC execution")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Network to execute on (mainnet, testnet)
    #[arg(short, long, global = true, default_value = "testnet")]
    network: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Supervise the monitor process and execute its signals
    Run {
        /// Treat every signal as a simulation, never touch the chain
        #[arg(long)]
        simulate_only: bool,

        /// Monitor command and its arguments, e.g. `-- python monitor.py`
        #[arg(trailing_var_arg = true, required = true)]
        monitor: Vec<String>,
    },

    /// Fire a single synthetic signal through the execution gate
    Fire {
        /// Counter token: address or known symbol (BUSD, CAKE, ...)
        #[arg(long)]
        token: String,

        /// Label for logs; defaults to the registry symbol
        #[arg(long)]
        token_name: Option<String>,

        /// Base-token amount in whole units
        #[arg(long, default_value = "0.05")]
        amount: String,

        /// Log only, do not execute
        #[arg(long)]
        simulate: bool,
    },

    /// Show the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let network = parse_network(&cli.network)?;

    match cli.command {
        Commands::Run {
            simulate_only,
            monitor,
        } => {
            run_bridge(network, simulate_only, monitor).await?;
        }
        Commands::Fire {
            token,
            token_name,
            amount,
            simulate,
        } => {
            run_fire(network, token, token_name, amount, simulate).await?;
        }
        Commands::Config => {
            let config = BridgeConfig::from_env(network)?;
            println!("{}", serde_json::to_string_pretty(&config).unwrap());
        }
    }

    Ok(())
}

fn parse_network(network: &str) -> Result<Network> {
    match network.to_lowercase().as_str() {
        "mainnet" | "bsc" | "bsc-mainnet" => Ok(Network::BscMainnet),
        "testnet" | "bsc-testnet" => Ok(Network::BscTestnet),
        other => Err(Error::Config(format!("Unknown network: {other}"))),
    }
}

async fn run_bridge(network: Network, simulate_only: bool, monitor: Vec<String>) -> Result<()> {
    let config = BridgeConfig::from_env(network)?;
    let wallet = SecureWallet::from_env()?;

    tracing::info!(
        network = network.name(),
        executor = %config.contracts.executor,
        wallet = %wallet.address(),
        simulate_only,
        "Starting signal bridge"
    );

    bnb_arb_bridge::bridge::preflight(&config, &wallet).await?;

    let executor = Arc::new(ArbExecutor::new(&config, &wallet));
    let gate = Arc::new(ExecutionGate::new(&config, executor).with_simulate_only(simulate_only));

    let (command, args) = monitor
        .split_first()
        .ok_or_else(|| Error::Config("no monitor command given".to_string()))?;

    Bridge::new(&config, gate).run(command, args).await
}

async fn run_fire(
    network: Network,
    token: String,
    token_name: Option<String>,
    amount: String,
    simulate: bool,
) -> Result<()> {
    use bnb_arb_bridge::tokens::registry;

    let config = BridgeConfig::from_env(network)?;
    let wallet = SecureWallet::from_env()?;

    let address = registry()
        .resolve(network.chain_id(), &token)
        .ok_or_else(|| {
            Error::Config(format!(
                "Unknown token {token:?} on {}; pass a 0x address",
                network.name()
            ))
        })?;
    let token_name = token_name.unwrap_or_else(|| registry().label(&address));

    bnb_arb_bridge::bridge::preflight(&config, &wallet).await?;

    let executor = Arc::new(ArbExecutor::new(&config, &wallet));
    let gate = ExecutionGate::new(&config, executor);

    let signal = Signal {
        token: address.to_string(),
        token_name,
        amount,
        is_simulation: simulate,
    };

    match gate.handle(&signal).await {
        TradeOutcome::Executed(receipt) => {
            println!("Trade EXECUTED");
            println!("  Tx hash: {}", receipt.tx_hash);
            println!("  Block:   {}", receipt.block_number);
            println!(
                "  View:    {}",
                network.explorer_tx_url(&receipt.tx_hash.to_string())
            );
        }
        TradeOutcome::Simulated => {
            println!("SIMULATION only, nothing submitted");
        }
        TradeOutcome::Suppressed(reason) => {
            println!("Trade suppressed: {reason}");
        }
        TradeOutcome::Failed(reason) => {
            println!("Trade FAILED: {reason}");
            return Err(Error::Execution(reason));
        }
    }

    Ok(())
}
