//! Core error types for the Vaultfolio engine.
//!
//! The engine itself never fails on bad data: malformed records are dropped at
//! the parsing boundary and logged. Errors here surface configuration problems
//! and failures of the upstream history source.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine and its services.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("History source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Record-level validation failures raised while converting raw source records
/// into typed engine inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Invalid numeric value '{value}' for field {field}")]
    InvalidNumber { field: String, value: String },

    #[error("Unknown transaction kind '{0}'")]
    UnknownTransactionKind(String),
}

/// Failures reported by a `VaultHistorySourceTrait` implementation.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Page limit of {max_pages} pages reached while fetching {entity}")]
    PageLimitExceeded { entity: String, max_pages: usize },
}
