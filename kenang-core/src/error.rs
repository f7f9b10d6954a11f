//! Error types for the kenang core library.

use thiserror::Error;

/// Top-level error type for all kenang core operations.
///
/// None of these are fatal to a session: callers degrade to defaults and
/// surface a status message instead.
#[derive(Error, Debug)]
pub enum KenangError {
    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A persistence collaborator refused or failed an operation.
    #[error("Memory store error: {0}")]
    Store(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for KenangError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, KenangError>;
