//! RPC endpoint configuration
//!
//! Resolves the JSON-RPC URL for each supported chain. Resolution order:
//!
//! 1. Per-network environment variables (`BSC_MAINNET_RPC`, `BSC_TESTNET_RPC`)
//! 2. Public Binance-operated endpoints
//!
//! The public endpoints are rate limited and fine for the testnet demo;
//! anything running against mainnet should set a dedicated provider URL.

use std::collections::HashMap;

/// Chain IDs for the supported networks.
pub mod chains {
    pub const BSC_MAINNET: u64 = 56;
    pub const BSC_TESTNET: u64 = 97;
}

mod env_vars {
    pub const BSC_MAINNET_RPC: &str = "BSC_MAINNET_RPC";
    pub const BSC_TESTNET_RPC: &str = "BSC_TESTNET_RPC";
}

mod public_rpcs {
    pub const BSC_MAINNET: &str = "https://bsc-dataseed1.binance.org/";
    pub const BSC_TESTNET: &str = "https://data-seed-prebsc-1-s1.binance.org:8545/";
}

/// Maps chain IDs to JSON-RPC endpoint URLs.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    urls: HashMap<u64, String>,
}

impl RpcConfig {
    /// Build the RPC map from the environment, falling back to the public
    /// endpoints for any chain without a configured URL.
    pub fn from_env() -> Self {
        let mut urls = HashMap::new();

        if let Ok(url) = std::env::var(env_vars::BSC_MAINNET_RPC) {
            tracing::debug!("Using BSC_MAINNET_RPC for BSC mainnet");
            urls.insert(chains::BSC_MAINNET, url);
        }
        if let Ok(url) = std::env::var(env_vars::BSC_TESTNET_RPC) {
            tracing::debug!("Using BSC_TESTNET_RPC for BSC testnet");
            urls.insert(chains::BSC_TESTNET, url);
        }

        urls.entry(chains::BSC_MAINNET)
            .or_insert_with(|| public_rpcs::BSC_MAINNET.to_string());
        urls.entry(chains::BSC_TESTNET)
            .or_insert_with(|| public_rpcs::BSC_TESTNET.to_string());

        Self { urls }
    }

    /// Build from an explicit chain-to-URL map.
    pub fn with_urls(urls: HashMap<u64, String>) -> Self {
        Self { urls }
    }

    /// The endpoint URL for a chain, if one is configured.
    pub fn get(&self, chain_id: u64) -> Option<&str> {
        self.urls.get(&chain_id).map(String::as_str)
    }

    pub fn has_chain(&self, chain_id: u64) -> bool {
        self.urls.contains_key(&chain_id)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
