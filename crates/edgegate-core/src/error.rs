//! Shared error type across edgegate crates.

use thiserror::Error;

use crate::protocol::{MessageType, Scheme};

/// Stable error codes (used as log fields and metric labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Decoded payload was not a message map.
    Malformed,
    /// Undecodable JSON or envelope shape.
    BadRequest,
    /// A required routing key was absent.
    MissingKey,
    /// No handler registered for scheme/type.
    UnknownHandler,
    /// Uplink or session not reachable right now.
    Unavailable,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Malformed => "MALFORMED",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::MissingKey => "MISSING_KEY",
            ErrorCode::UnknownHandler => "UNKNOWN_HANDLER",
            ErrorCode::Unavailable => "UNAVAILABLE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, EdgeError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum EdgeError {
    #[error("payload is not a message map")]
    NotAMessageMap,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("missing key attribute {0}")]
    MissingKey(&'static str),
    #[error("no handler for {scheme}/{msg_type}")]
    UnknownHandler { scheme: Scheme, msg_type: MessageType },
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl EdgeError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            EdgeError::NotAMessageMap => ErrorCode::Malformed,
            EdgeError::BadRequest(_) => ErrorCode::BadRequest,
            EdgeError::MissingKey(_) => ErrorCode::MissingKey,
            EdgeError::UnknownHandler { .. } => ErrorCode::UnknownHandler,
            EdgeError::Unavailable(_) => ErrorCode::Unavailable,
            EdgeError::Internal(_) => ErrorCode::Internal,
        }
    }
}
