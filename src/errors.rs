//! # Client Error Taxonomy
//!
//! Every failure a call can produce, as one typed enum. Variants map
//! one-to-one onto the retry semantics callers care about: configuration
//! and validation problems are never retried, transport-level failures
//! and 5xx responses may be retried for idempotent verbs, auth rejections
//! and decode failures never are.

use thiserror::Error;

/// Result type for all client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors produced by the client
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Bad local setup: invalid endpoint, blank access key, malformed token
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connection-level failure before a response was received
    #[error("Network error for {method} {path}: {message}")]
    Network {
        method: String,
        path: String,
        message: String,
    },

    /// The configured timeout expired before the response arrived
    #[error("Request timed out: {method} {path}")]
    Timeout { method: String, path: String },

    /// Signature rejected or insufficient permissions (401/403)
    #[error("Authorization rejected for {path} (HTTP {status}): {message}")]
    Auth {
        status: u16,
        path: String,
        message: String,
    },

    /// The server rejected the request shape (400)
    #[error("Invalid request for {path}: {message}")]
    Validation {
        status: u16,
        path: String,
        message: String,
    },

    /// The resource does not exist (404)
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// Server-side failure (5xx)
    #[error("Service error for {path} (HTTP {status}): {message}")]
    Service {
        status: u16,
        path: String,
        message: String,
    },

    /// Malformed body on a success status. A contract violation, not a
    /// transient condition.
    #[error("Undecodable response for {path} (HTTP {status}): {message}")]
    Decode {
        status: u16,
        path: String,
        message: String,
    },
}

impl ClientError {
    /// HTTP status associated with this error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Auth { status, .. }
            | ClientError::Validation { status, .. }
            | ClientError::Service { status, .. }
            | ClientError::Decode { status, .. } => Some(*status),
            ClientError::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// True for transient failures that an idempotent call may retry.
    ///
    /// Auth rejections are deliberately excluded: retrying with the same
    /// rejected signature cannot succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Network { .. } | ClientError::Timeout { .. } | ClientError::Service { .. }
        )
    }

    /// Locally-detected bad input, reported with the same shape the server
    /// would use for a 400
    pub(crate) fn invalid_input(path: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::Validation {
            status: 400,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Map a non-success HTTP status to an error, carrying the server's
    /// message text when present
    pub(crate) fn from_status(status: u16, path: &str, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| "no message".to_string());
        let path = path.to_string();
        match status {
            400 => ClientError::Validation {
                status,
                path,
                message,
            },
            401 | 403 => ClientError::Auth {
                status,
                path,
                message,
            },
            404 => ClientError::NotFound { path },
            500..=599 => ClientError::Service {
                status,
                path,
                message,
            },
            // 405, 409, 429 and friends carry no dedicated variant; they
            // share the validation semantics (fix the request, then retry)
            _ => ClientError::Validation {
                status,
                path,
                message,
            },
        }
    }
}
