//! Bridge configuration
//!
//! Everything the bridge needs is resolved once at startup into an
//! immutable [`BridgeConfig`] and handed to the components that use it.
//! Values come from the environment (a `.env` file is honored) with
//! defaults suitable for the BSC testnet demo deployment.

pub mod rpc;

pub use rpc::RpcConfig;

use crate::tokens::addresses;
use crate::{Error, Result};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod env_vars {
    pub const ARB_EXECUTOR_ADDRESS: &str = "ARB_EXECUTOR_ADDRESS";
    pub const ROUTER_A_ADDRESS: &str = "ROUTER_A_ADDRESS";
    pub const ROUTER_B_ADDRESS: &str = "ROUTER_B_ADDRESS";
    pub const BASE_TOKEN_ADDRESS: &str = "BASE_TOKEN_ADDRESS";
    pub const GAS_LIMIT: &str = "GAS_LIMIT";
    pub const CONFIRM_TIMEOUT_SECS: &str = "CONFIRM_TIMEOUT_SECS";
    pub const DEDUP_WINDOW_SECS: &str = "DEDUP_WINDOW_SECS";
    pub const CIRCUIT_BREAKER_MAX_FAILURES: &str = "CIRCUIT_BREAKER_MAX_FAILURES";
    pub const CIRCUIT_BREAKER_COOLDOWN_MIN: &str = "CIRCUIT_BREAKER_COOLDOWN_MIN";
    pub const TRADE_LOG_PATH: &str = "TRADE_LOG_PATH";
}

/// Networks the bridge can execute on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    BscMainnet,
    BscTestnet,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::BscMainnet => rpc::chains::BSC_MAINNET,
            Network::BscTestnet => rpc::chains::BSC_TESTNET,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::BscMainnet => "bsc-mainnet",
            Network::BscTestnet => "bsc-testnet",
        }
    }

    /// Block-explorer link for a transaction hash.
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        match self {
            Network::BscMainnet => format!("https://bscscan.com/tx/{tx_hash}"),
            Network::BscTestnet => format!("https://testnet.bscscan.com/tx/{tx_hash}"),
        }
    }

    /// PancakeSwap V2 router deployed on this network.
    pub fn default_router(&self) -> Address {
        match self {
            Network::BscMainnet => addresses::PANCAKE_V2_ROUTER_MAINNET,
            Network::BscTestnet => addresses::PANCAKE_V2_ROUTER_TESTNET,
        }
    }

    /// Wrapped BNB on this network.
    pub fn wrapped_native(&self) -> Address {
        match self {
            Network::BscMainnet => addresses::WBNB_MAINNET,
            Network::BscTestnet => addresses::WBNB_TESTNET,
        }
    }
}

/// On-chain contracts the bridge interacts with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    /// Deployed arbitrage executor contract. Required.
    pub executor: Address,
    /// First router leg. Defaults to PancakeSwap V2.
    pub router_a: Address,
    /// Second router leg. Defaults to PancakeSwap V2.
    pub router_b: Address,
    /// Token the trade starts and ends in. Defaults to WBNB.
    pub base_token: Address,
}

impl ContractsConfig {
    fn defaults_for(network: Network) -> Self {
        Self {
            executor: Address::ZERO,
            router_a: network.default_router(),
            router_b: network.default_router(),
            base_token: network.wrapped_native(),
        }
    }
}

/// Execution limits and guard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Fixed gas ceiling for the executor call. No estimation is done.
    pub gas_limit: u64,
    /// Consecutive failures before the circuit breaker trips.
    pub max_failures: u32,
    /// How long a tripped breaker stays open.
    pub breaker_cooldown_secs: u64,
    /// How long to wait for a submitted transaction to be mined.
    pub confirm_timeout_secs: u64,
    /// Window for suppressing repeats of the same signal. Zero disables.
    pub dedup_window_secs: u64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            gas_limit: 500_000,
            max_failures: 3,
            breaker_cooldown_secs: 15 * 60,
            confirm_timeout_secs: 120,
            dedup_window_secs: 120,
        }
    }
}

impl SafetyConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            gas_limit: env_parse(env_vars::GAS_LIMIT, defaults.gas_limit),
            max_failures: env_parse(env_vars::CIRCUIT_BREAKER_MAX_FAILURES, defaults.max_failures),
            breaker_cooldown_secs: env_parse(env_vars::CIRCUIT_BREAKER_COOLDOWN_MIN, 15u64) * 60,
            confirm_timeout_secs: env_parse(
                env_vars::CONFIRM_TIMEOUT_SECS,
                defaults.confirm_timeout_secs,
            ),
            dedup_window_secs: env_parse(env_vars::DEDUP_WINDOW_SECS, defaults.dedup_window_secs),
        }
    }

    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.breaker_cooldown_secs)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_secs(self.dedup_window_secs)
    }
}

/// Complete resolved configuration for one bridge run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub network: Network,
    pub contracts: ContractsConfig,
    pub safety: SafetyConfig,
    /// JSON-RPC endpoint resolved for `network`.
    pub rpc_url: String,
    /// Where gate decisions are appended as JSONL. `None` disables the log.
    pub trade_log_path: Option<String>,
}

impl BridgeConfig {
    /// Resolve the full configuration for a network from the environment.
    pub fn from_env(network: Network) -> Result<Self> {
        let rpc = RpcConfig::from_env();
        let rpc_url = rpc
            .get(network.chain_id())
            .ok_or_else(|| {
                Error::Config(format!("no RPC endpoint configured for {}", network.name()))
            })?
            .to_string();

        let mut contracts = ContractsConfig::defaults_for(network);
        contracts.executor = env_address(env_vars::ARB_EXECUTOR_ADDRESS)?.ok_or_else(|| {
            Error::Config(format!(
                "{} is not set; the bridge needs the deployed executor contract",
                env_vars::ARB_EXECUTOR_ADDRESS
            ))
        })?;
        if let Some(addr) = env_address(env_vars::ROUTER_A_ADDRESS)? {
            contracts.router_a = addr;
        }
        if let Some(addr) = env_address(env_vars::ROUTER_B_ADDRESS)? {
            contracts.router_b = addr;
        }
        if let Some(addr) = env_address(env_vars::BASE_TOKEN_ADDRESS)? {
            contracts.base_token = addr;
        }

        let trade_log_path = match std::env::var(env_vars::TRADE_LOG_PATH) {
            Ok(path) if path.trim().is_empty() => None,
            Ok(path) => Some(path),
            Err(_) => Some("trades.jsonl".to_string()),
        };

        let config = Self {
            network,
            contracts,
            safety: SafetyConfig::from_env(),
            rpc_url,
            trade_log_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot possibly execute a trade.
    pub fn validate(&self) -> Result<()> {
        if self.contracts.executor == Address::ZERO {
            return Err(Error::Config(
                "executor contract address must not be the zero address".to_string(),
            ));
        }
        if self.safety.gas_limit == 0 {
            return Err(Error::Config("gas limit must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_address(key: &str) -> Result<Option<Address>> {
    match std::env::var(key) {
        Ok(s) if !s.trim().is_empty() => {
            let addr = s
                .trim()
                .parse::<Address>()
                .map_err(|e| Error::Config(format!("{key} is not a valid address: {e}")))?;
            Ok(Some(addr))
        }
        _ => Ok(None),
    }
}
