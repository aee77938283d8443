//! Error types for the crawler module

use thiserror::Error;

/// Error type for fetch and extraction operations
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed; no connection was attempted
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The deadline expired before the response body arrived
    #[error("Request timeout after {timeout_ms}ms: {url}")]
    Timeout {
        /// Requested URL
        url: String,
        /// Deadline that expired
        timeout_ms: u128,
    },

    /// The server answered with a non-2xx status
    #[error("{status} from {url}")]
    Status {
        /// Response status
        status: reqwest::StatusCode,
        /// Requested URL
        url: String,
    },

    /// Connection, TLS, redirect or body decoding failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The page was fetched but held too little readable text
    #[error("Extracted content too short ({length} characters)")]
    ContentTooShort {
        /// Length of the extracted text in characters
        length: usize,
    },

    /// The User-Agent rotation is empty, so nothing was tried
    #[error("No User-Agent configured for {0}")]
    NoUserAgents(String),
}

impl FetchError {
    /// Whether this failure is a deadline expiry
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}
