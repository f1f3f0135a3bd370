//! Error types for the signal bridge

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Monitor process error: {0}")]
    Monitor(String),

    #[error("Signal error: {0}")]
    Signal(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Transaction reverted: {0}")]
    Reverted(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
