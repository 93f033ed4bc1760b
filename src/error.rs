//! Error types for the upload ledger.

use thiserror::Error;

/// Errors raised by the ledger merger.
///
/// Parsing an existing ledger never fails; only bad input records do.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The version tag supplied with a write no longer matches the stored revision.
    #[error("Version conflict writing {path}: the document changed since it was read")]
    Conflict { path: String },

    #[error("Store rejected credentials: {0}")]
    Unauthorized(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid store response: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Top-level errors surfaced to callers of the publisher, uploader and CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Upload rejected: {0}")]
    Unauthorized(String),

    #[error("Ledger {path} kept changing; gave up after {attempts} attempts")]
    ConflictRetriesExhausted { path: String, attempts: u32 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to encode output: {0}")]
    Output(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
