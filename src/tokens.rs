//! Token and contract addresses
//!
//! Single source of truth for the BSC addresses the bridge touches: the
//! PancakeSwap V2 routers, wrapped BNB, and the tokens the monitor is known
//! to signal on. Symbols resolve per chain so `BUSD` means the right
//! contract on mainnet and testnet alike.

use alloy::primitives::{address, Address};
use std::collections::HashMap;
use std::sync::OnceLock;

pub mod addresses {
    use super::*;

    // === BSC Mainnet (chain 56) ===
    pub const PANCAKE_V2_ROUTER_MAINNET: Address =
        address!("10ed43c718714eb63d5aa57b78b54704e256024e");
    pub const WBNB_MAINNET: Address = address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c");
    pub const CAKE_MAINNET: Address = address!("0e09fabb73bd3ade0a17ecc321fd13a19e81ce82");
    pub const BTCB_MAINNET: Address = address!("7130d2a12b9bcbfae4f2634d864a1ee1ce3ead9c");
    pub const ETH_MAINNET: Address = address!("2170ed0880ac9a755fd29b2688956bd959f933f8");
    pub const BUSD_MAINNET: Address = address!("e9e7cea3dedca5984780bafc599bd69add087d56");
    pub const USDT_MAINNET: Address = address!("55d398326f99059ff775485246999027b3197955");
    pub const BABYDOGE_MAINNET: Address = address!("c748673057861a797275cd8a068abb95a902e8de");

    // === BSC Testnet (chain 97) ===
    pub const PANCAKE_V2_ROUTER_TESTNET: Address =
        address!("d99d1c33f9fc3444f8101754abc46c52416550d1");
    pub const WBNB_TESTNET: Address = address!("ae13d989dac2f0debff460ac112a837c89baa7cd");
    pub const CAKE_TESTNET: Address = address!("a35062ea4301827e69e6008e18d14f5d8c3dba3e");
    pub const BUSD_TESTNET: Address = address!("ed24fc36d5ee211ea25a80239fb8c4cfd80f12ee");
    pub const USDT_TESTNET: Address = address!("337610d27c682e347c9cd60bd4b3b107c9d34ddd");
    pub const DAI_TESTNET: Address = address!("8a9424745056eb399fd19a0ec26a14316684e274");
}

/// Static metadata about a known token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub symbol: &'static str,
    pub decimals: u8,
}

/// Lookup table over the known tokens.
pub struct TokenRegistry {
    tokens: HashMap<Address, TokenInfo>,
    symbols: HashMap<u64, HashMap<&'static str, Address>>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        use addresses::*;
        use crate::config::rpc::chains;

        let mut tokens = HashMap::new();
        let mut symbols: HashMap<u64, HashMap<&'static str, Address>> = HashMap::new();

        let mut register = |chain: u64, symbol: &'static str, decimals: u8, addr: Address| {
            tokens.insert(addr, TokenInfo { symbol, decimals });
            symbols.entry(chain).or_default().insert(symbol, addr);
        };

        register(chains::BSC_MAINNET, "WBNB", 18, WBNB_MAINNET);
        register(chains::BSC_MAINNET, "CAKE", 18, CAKE_MAINNET);
        register(chains::BSC_MAINNET, "BTCB", 18, BTCB_MAINNET);
        register(chains::BSC_MAINNET, "ETH", 18, ETH_MAINNET);
        register(chains::BSC_MAINNET, "BUSD", 18, BUSD_MAINNET);
        register(chains::BSC_MAINNET, "USDT", 18, USDT_MAINNET);
        register(chains::BSC_MAINNET, "BABYDOGE", 9, BABYDOGE_MAINNET);

        register(chains::BSC_TESTNET, "WBNB", 18, WBNB_TESTNET);
        register(chains::BSC_TESTNET, "CAKE", 18, CAKE_TESTNET);
        register(chains::BSC_TESTNET, "BUSD", 18, BUSD_TESTNET);
        register(chains::BSC_TESTNET, "USDT", 18, USDT_TESTNET);
        register(chains::BSC_TESTNET, "DAI", 18, DAI_TESTNET);

        Self { tokens, symbols }
    }

    pub fn get(&self, address: &Address) -> Option<&TokenInfo> {
        self.tokens.get(address)
    }

    /// Resolve an address string or a known symbol on the given chain.
    pub fn resolve(&self, chain_id: u64, token: &str) -> Option<Address> {
        if let Ok(addr) = token.parse::<Address>() {
            return Some(addr);
        }
        let symbol = token.to_uppercase();
        self.symbols.get(&chain_id)?.get(symbol.as_str()).copied()
    }

    /// Display label for an address: the symbol when known, otherwise the
    /// checksummed address.
    pub fn label(&self, address: &Address) -> String {
        self.get(address)
            .map(|info| info.symbol.to_string())
            .unwrap_or_else(|| address.to_string())
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: OnceLock<TokenRegistry> = OnceLock::new();

/// Shared global registry.
pub fn registry() -> &'static TokenRegistry {
    REGISTRY.get_or_init(TokenRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::rpc::chains;

    #[test]
    fn resolves_symbols_per_chain() {
        let registry = TokenRegistry::new();
        assert_eq!(
            registry.resolve(chains::BSC_MAINNET, "BUSD"),
            Some(addresses::BUSD_MAINNET)
        );
        assert_eq!(
            registry.resolve(chains::BSC_TESTNET, "BUSD"),
            Some(addresses::BUSD_TESTNET)
        );
        assert_eq!(
            registry.resolve(chains::BSC_TESTNET, "busd"),
            Some(addresses::BUSD_TESTNET)
        );
    }

    #[test]
    fn resolves_raw_addresses_on_any_chain() {
        let registry = TokenRegistry::new();
        let raw = "0xeD24FC36d5Ee211Ea25A80239Fb8C4Cfd80f12Ee";
        assert_eq!(
            registry.resolve(chains::BSC_TESTNET, raw),
            Some(addresses::BUSD_TESTNET)
        );
    }

    #[test]
    fn unknown_symbol_is_none() {
        let registry = TokenRegistry::new();
        assert_eq!(registry.resolve(chains::BSC_TESTNET, "DOGE"), None);
        // DAI only exists on the testnet side of the table
        assert_eq!(registry.resolve(chains::BSC_MAINNET, "DAI"), None);
    }

    #[test]
    fn labels_known_and_unknown_addresses() {
        let registry = TokenRegistry::new();
        assert_eq!(registry.label(&addresses::WBNB_TESTNET), "WBNB");

        let unknown = Address::ZERO;
        assert!(registry.label(&unknown).starts_with("0x"));
    }

    #[test]
    fn global_registry_is_shared() {
        let a = registry();
        let b = registry();
        assert!(std::ptr::eq(a, b));
    }
}
