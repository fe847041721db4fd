//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// Every failure a caller can observe maps to exactly one variant. Per-row
/// CSV problems are not errors; they end up in the import report instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("User with name '{0}' already exists")]
    DuplicateName(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("Error processing CSV file: {0}")]
    InputMalformed(String),

    #[error("{0}")]
    SchemaMismatch(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a duplicate name error
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName(name.into())
    }

    /// Create a not found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a malformed input error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::InputMalformed(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
