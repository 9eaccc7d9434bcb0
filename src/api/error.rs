//! Quiz backend error types

use thiserror::Error;

/// Backend error with classification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Server, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Connection failures, resets, unreadable bodies
    Transport,
    /// Non-success response, usually carrying an `error` message
    Server,
    /// A success response whose body is not what the contract says
    Decode,
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            ApiError::transport(format!("Connection failed: {e}"))
        } else if e.is_timeout() {
            ApiError::transport(format!("Request timeout: {e}"))
        } else if e.is_decode() {
            ApiError::decode(format!("Failed to read response: {e}"))
        } else {
            ApiError::transport(format!("Request failed: {e}"))
        }
    }
}
