//! Completion backend error types.

use thiserror::Error;

/// Errors that can occur while asking a backend for a completion.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("completion request failed: {0}")]
    RequestFailed(String),

    /// Backend response body could not be read.
    #[error("failed to parse completion response: {0}")]
    ParseError(String),

    /// Backend answered with a non-success status.
    #[error("completion backend returned HTTP {status}: {body}")]
    HttpStatus {
        /// Status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Request timed out.
    #[error("completion request timed out after {0}ms")]
    Timeout(u64),

    /// Backend is unreachable or not configured.
    #[error("completion backend unavailable: {0}")]
    Unavailable(String),

    /// Configuration error.
    #[error("completion backend configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(0)
        } else if err.is_connect() {
            LlmError::Unavailable(err.to_string())
        } else if err.is_decode() {
            LlmError::ParseError(err.to_string())
        } else {
            LlmError::RequestFailed(err.to_string())
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, LlmError>;
