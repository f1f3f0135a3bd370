//! Trade audit log
//!
//! Append-only JSONL record of every gate decision, kept for audit and
//! post-mortem purposes. Writing is best-effort: a failed write is a
//! warning, never an error that blocks trading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Final classification of one handled signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Executed,
    Simulated,
    Failed,
    Suppressed,
}

/// One line in the trade log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub token: String,
    pub token_name: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_wei: Option<String>,
    pub simulation: bool,
    pub status: TradeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TradeRecord {
    /// Start a record for a signal; outcome fields are filled by the gate.
    pub fn for_signal(signal: &crate::signal::Signal, status: TradeStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            token: signal.token.clone(),
            token_name: signal.token_name.clone(),
            amount: signal.amount.clone(),
            amount_wei: None,
            simulation: signal.is_simulation,
            status,
            tx_hash: None,
            block_number: None,
            reason: None,
        }
    }
}

/// Append-only JSONL writer.
pub struct TradeLog {
    path: Mutex<PathBuf>,
}

impl TradeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Mutex::new(path.into()),
        }
    }

    /// Append one record. Failures are logged and swallowed.
    pub async fn record(&self, record: &TradeRecord) {
        let path = self.path.lock().await;
        if let Err(e) = Self::append(&path, record) {
            tracing::warn!(error = %e, path = %path.display(), "Failed to write trade log entry");
        }
    }

    fn append(path: &PathBuf, record: &TradeRecord) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(record)?;
        writeln!(file, "{json}")?;
        Ok(())
    }
}
