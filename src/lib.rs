//! BNB Arbitrage Signal Bridge
//!
//! Supervises an external arbitrage monitor process and turns its tagged
//! `SIGNAL:` output lines into on-chain executions against a fixed
//! executor contract on BSC.
//!
//! # Security Model
//!
//! - Private keys never leave the wallet module and are never logged
//! - Simulation signals never reach the chain
//! - Submissions are serialized behind a single in-flight slot
//! - A circuit breaker pauses execution after consecutive failures
//! - Every gate decision lands in an append-only trade log

pub mod bridge;
pub mod config;
pub mod executor;
pub mod gate;
pub mod monitor;
pub mod signal;
pub mod tokens;
pub mod trade_log;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use bridge::Bridge;
pub use config::{BridgeConfig, Network, RpcConfig};
pub use error::{Error, Result};
pub use executor::{ArbExecutor, TradeExecutor, TradePlan, TradeReceipt};
pub use gate::{ExecutionGate, TradeOutcome};
pub use signal::Signal;
