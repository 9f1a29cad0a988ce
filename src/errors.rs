use thiserror::Error;

/// Error type that captures storage and configuration failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
