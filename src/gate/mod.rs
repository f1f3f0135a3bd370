//! Execution gate
//!
//! Decides whether an extracted [`Signal`] produces an on-chain action and
//! performs it. The gate is the safety boundary between the monitor's
//! output and real money:
//!
//! - simulation signals are logged and never reach the chain
//! - a single-slot in-flight lock serializes submissions, so two real
//!   signals in quick succession can never race on the wallet nonce
//! - repeats of an identical signal inside the dedup window are suppressed
//! - a circuit breaker pauses execution after consecutive failures
//!
//! Every decision is appended to the trade log.

mod circuit_breaker;
mod dedup;

pub use circuit_breaker::CircuitBreaker;
pub use dedup::DedupWindow;

use crate::config::{BridgeConfig, ContractsConfig};
use crate::executor::{to_base_units, TradeExecutor, TradePlan, TradeReceipt};
use crate::signal::Signal;
use crate::trade_log::{TradeLog, TradeRecord, TradeStatus};
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// What became of one handled signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeOutcome {
    /// Simulation flag was set; nothing touched the chain.
    Simulated,
    /// Confirmed on-chain.
    Executed(TradeReceipt),
    /// Guarded off before submission (breaker open, duplicate).
    Suppressed(String),
    /// Rejected or reverted; the reason is operator-facing.
    Failed(String),
}

pub struct ExecutionGate {
    contracts: ContractsConfig,
    executor: Arc<dyn TradeExecutor>,
    breaker: CircuitBreaker,
    dedup: DedupWindow,
    /// Held across submission and confirmation. One trade at a time.
    in_flight: Mutex<()>,
    trade_log: Option<TradeLog>,
    simulate_only: bool,
}

impl ExecutionGate {
    pub fn new(config: &BridgeConfig, executor: Arc<dyn TradeExecutor>) -> Self {
        Self {
            contracts: config.contracts.clone(),
            executor,
            breaker: CircuitBreaker::new(
                config.safety.max_failures,
                config.safety.breaker_cooldown(),
            ),
            dedup: DedupWindow::new(config.safety.dedup_window()),
            in_flight: Mutex::new(()),
            trade_log: config.trade_log_path.as_ref().map(TradeLog::new),
            simulate_only: false,
        }
    }

    /// Treat every signal as a simulation regardless of its flag.
    pub fn with_simulate_only(mut self, simulate_only: bool) -> Self {
        self.simulate_only = simulate_only;
        self
    }

    /// Handle one signal to completion. Never fails; every path resolves to
    /// a logged [`TradeOutcome`].
    pub async fn handle(&self, signal: &Signal) -> TradeOutcome {
        if signal.is_simulation || self.simulate_only {
            info!(
                token_name = %signal.token_name,
                amount = %signal.amount,
                "SIMULATION signal, not executing"
            );
            self.record(TradeRecord::for_signal(signal, TradeStatus::Simulated))
                .await;
            return TradeOutcome::Simulated;
        }

        let token = match signal.token.parse::<Address>() {
            Ok(addr) => addr,
            Err(e) => {
                let reason = format!("signal token {:?} is not an address: {e}", signal.token);
                return self.fail(signal, reason, None).await;
            }
        };
        let amount_in = match to_base_units(&signal.amount) {
            Ok(wei) => wei,
            Err(e) => return self.fail(signal, e.to_string(), None).await,
        };

        let plan = TradePlan {
            router_a: self.contracts.router_a,
            router_b: self.contracts.router_b,
            token_a: self.contracts.base_token,
            token_b: token,
            amount_in,
        };

        let _slot = self.in_flight.lock().await;

        if !self.breaker.allow_trade().await {
            return self
                .suppress(signal, "circuit breaker open".to_string(), amount_in)
                .await;
        }
        if !self.dedup.check_and_record(token, amount_in).await {
            return self
                .suppress(
                    signal,
                    "duplicate signal within dedup window".to_string(),
                    amount_in,
                )
                .await;
        }

        info!(
            token_name = %signal.token_name,
            token = %plan.token_b,
            amount_wei = %plan.amount_in,
            "Executing trade"
        );

        match self.executor.execute(&plan).await {
            Ok(receipt) => {
                self.breaker.record_success().await;
                info!(
                    tx_hash = %receipt.tx_hash,
                    block_number = receipt.block_number,
                    "Trade EXECUTED and confirmed"
                );
                let mut record = TradeRecord::for_signal(signal, TradeStatus::Executed);
                record.amount_wei = Some(amount_in.to_string());
                record.tx_hash = Some(receipt.tx_hash.to_string());
                record.block_number = Some(receipt.block_number);
                self.record(record).await;
                TradeOutcome::Executed(receipt)
            }
            Err(e) => {
                self.breaker.record_failure().await;
                self.fail(signal, e.to_string(), Some(amount_in)).await
            }
        }
    }

    async fn fail(&self, signal: &Signal, reason: String, amount_wei: Option<U256>) -> TradeOutcome {
        error!(token_name = %signal.token_name, reason = %reason, "Trade FAILED");
        let mut record = TradeRecord::for_signal(signal, TradeStatus::Failed);
        record.amount_wei = amount_wei.map(|w| w.to_string());
        record.reason = Some(reason.clone());
        self.record(record).await;
        TradeOutcome::Failed(reason)
    }

    async fn suppress(&self, signal: &Signal, reason: String, amount_wei: U256) -> TradeOutcome {
        warn!(token_name = %signal.token_name, reason = %reason, "Trade suppressed");
        let mut record = TradeRecord::for_signal(signal, TradeStatus::Suppressed);
        record.amount_wei = Some(amount_wei.to_string());
        record.reason = Some(reason.clone());
        self.record(record).await;
        TradeOutcome::Suppressed(reason)
    }

    async fn record(&self, record: TradeRecord) {
        if let Some(log) = &self.trade_log {
            log.record(&record).await;
        }
    }
}
