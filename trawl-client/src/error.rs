//! Error types for the worker client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when calling a worker node
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (includes connect errors and timeouts)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Worker returned an error status code
    #[error("worker error (status {status}): {message}")]
    WorkerError {
        /// HTTP status code
        status: u16,
        /// Error message from the worker
        message: String,
    },

    /// Failed to parse response
    #[error("failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create a worker error from status code and message
    pub fn worker_error(status: u16, message: impl Into<String>) -> Self {
        Self::WorkerError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestFailed(e) if e.is_timeout())
    }
}
