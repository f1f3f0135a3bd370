//! On-chain trade execution
//!
//! The [`TradeExecutor`] trait is the seam between the gate and the chain:
//! production uses [`ArbExecutor`] over an alloy provider, tests substitute a
//! stub. The executor contract's entry point is fixed; only the counter
//! token and the input amount vary per trade.
//!
//! Before spending gas, every submission is preflighted with `eth_call` so a
//! revert surfaces its decoded reason (e.g. "Trade not profitable!
//! Reverting...") instead of a burned transaction.

use crate::config::BridgeConfig;
use crate::wallet::SecureWallet;
use crate::{Error, Result};
use alloy::hex;
use alloy::network::EthereumWallet;
use alloy::primitives::utils::parse_units;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::ProviderBuilder;
use async_trait::async_trait;
use std::time::Duration;

alloy::sol! {
    #[sol(rpc)]
    interface IArbExecutor {
        function executeArbitrage(
            address routerA,
            address routerB,
            address tokenA,
            address tokenB,
            uint256 amountIn
        ) external;
    }
}

/// Fully resolved arguments for one `executeArbitrage` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradePlan {
    pub router_a: Address,
    pub router_b: Address,
    /// Base token the trade starts and ends in (WBNB).
    pub token_a: Address,
    /// Counter token from the signal.
    pub token_b: Address,
    /// Input amount in base units (wei).
    pub amount_in: U256,
}

/// Proof of inclusion for a confirmed trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
}

/// Boundary between the execution gate and the chain.
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    /// Submit the plan and wait for on-chain confirmation.
    async fn execute(&self, plan: &TradePlan) -> Result<TradeReceipt>;
}

/// Convert a human-decimal base-token amount to 18-decimal base units.
pub fn to_base_units(amount: &str) -> Result<U256> {
    let wei: U256 = parse_units(amount.trim(), 18)
        .map_err(|e| Error::Signal(format!("invalid amount {amount:?}: {e}")))?
        .into();
    if wei.is_zero() {
        return Err(Error::Signal(format!("amount {amount:?} rounds to zero wei")));
    }
    Ok(wei)
}

/// Production executor submitting through a wallet-backed alloy provider.
pub struct ArbExecutor {
    rpc_url: String,
    executor: Address,
    wallet: EthereumWallet,
    gas_limit: u64,
    confirm_timeout: Duration,
}

impl ArbExecutor {
    pub fn new(config: &BridgeConfig, wallet: &SecureWallet) -> Self {
        Self {
            rpc_url: config.rpc_url.clone(),
            executor: config.contracts.executor,
            wallet: wallet.wallet().clone(),
            gas_limit: config.safety.gas_limit,
            confirm_timeout: config.safety.confirm_timeout(),
        }
    }
}

#[async_trait]
impl TradeExecutor for ArbExecutor {
    async fn execute(&self, plan: &TradePlan) -> Result<TradeReceipt> {
        let url: url::Url = self
            .rpc_url
            .parse()
            .map_err(|e| Error::Rpc(format!("invalid RPC URL: {e}")))?;

        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .connect_http(url);

        let contract = IArbExecutor::new(self.executor, &provider);
        let call = contract
            .executeArbitrage(
                plan.router_a,
                plan.router_b,
                plan.token_a,
                plan.token_b,
                plan.amount_in,
            )
            .gas(self.gas_limit);

        // Static preflight. A revert here costs nothing and yields the
        // contract's reason string.
        if let Err(e) = call.call().await {
            return Err(Error::Reverted(parse_revert_reason(&e.to_string())));
        }

        let confirmed = tokio::time::timeout(self.confirm_timeout, async {
            let pending = call
                .send()
                .await
                .map_err(|e| Error::Execution(parse_revert_reason(&e.to_string())))?;
            let tx_hash = *pending.tx_hash();
            tracing::info!(tx_hash = %tx_hash, "Transaction submitted, awaiting confirmation");

            let receipt = pending
                .get_receipt()
                .await
                .map_err(|e| Error::Execution(format!("confirmation failed for {tx_hash}: {e}")))?;
            Ok::<_, Error>(receipt)
        })
        .await
        .map_err(|_| {
            Error::Execution(format!(
                "no confirmation within {}s",
                self.confirm_timeout.as_secs()
            ))
        })??;

        if !confirmed.status() {
            return Err(Error::Reverted(format!(
                "transaction {} reverted on-chain",
                confirmed.transaction_hash
            )));
        }

        Ok(TradeReceipt {
            tx_hash: confirmed.transaction_hash,
            block_number: confirmed.block_number.unwrap_or_default(),
        })
    }
}

/// Extract a human-readable revert reason from an RPC error message.
///
/// Handles the `revert: <reason>` text form and raw `Error(string)` ABI
/// return data; falls back to the full error text.
pub fn parse_revert_reason(error: &str) -> String {
    if error.contains("execution reverted") {
        if let Some(start) = error.find("revert: ") {
            let reason = &error[start + 8..];
            if let Some(end) = reason.find('"') {
                return reason[..end].to_string();
            }
            return reason.to_string();
        }
        if let Some(start) = error.find("0x") {
            let hex_data = &error[start..];
            let end = hex_data
                .find(|c: char| !c.is_ascii_hexdigit() && c != 'x')
                .unwrap_or(hex_data.len());
            let hex_str = &hex_data[..end];
            // Error(string) selector is 0x08c379a0; the string payload
            // starts after the selector, offset and length words.
            if hex_str.starts_with("0x08c379a0") && hex_str.len() > 138 {
                if let Ok(decoded) = hex::decode(&hex_str[138..]) {
                    let filtered: Vec<u8> = decoded.into_iter().filter(|&b| b != 0).collect();
                    if let Ok(s) = String::from_utf8(filtered) {
                        return s;
                    }
                }
            }
            return format!("Reverted with data: {hex_str}");
        }
        return "execution reverted".to_string();
    }

    error.to_string()
}
