// crates/network/src/error.rs
//! Error types for network operations

use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur during network operations
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Transport-level failure (connection refused, DNS, broken body)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Timeout
    #[error("Operation timed out")]
    Timeout,

    /// Network unavailable
    #[error("Network is unavailable")]
    NetworkUnavailable,
}

impl NetworkError {
    /// Converts a reqwest error, separating out timeouts and bad URLs
    pub(crate) fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout
        } else if err.is_builder() {
            NetworkError::InvalidUrl(err.to_string())
        } else {
            NetworkError::Http(err)
        }
    }

    /// Returns true if the server could not be reached at all
    pub fn is_connect(&self) -> bool {
        match self {
            NetworkError::Http(e) => e.is_connect(),
            NetworkError::NetworkUnavailable => true,
            _ => false,
        }
    }
}
