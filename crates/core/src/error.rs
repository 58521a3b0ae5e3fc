//! Core Error Types
//!
//! Error types shared across the PromptGuard workspace: `CoreError` for
//! malformed input, `BackendError` for failed calls to the moderation
//! backend. The application crate wraps `BackendError` in its own `AppError`.

use thiserror::Error;

/// Rejected input: bad settings or an unrecognized wire key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// Errors raised while talking to the moderation backend.
///
/// Every variant is a transport-level failure: the backend never produced a
/// usable `ProcessResponse`. An explicit block (`success = false`) is a normal
/// response, not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Non-2xx HTTP status
    #[error("Backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection, TLS, or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Backend base URL or endpoint path is unusable
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for backend calls
pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// HTTP status code, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
