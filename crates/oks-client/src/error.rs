//! OKS client errors

use thiserror::Error;

/// Errors that can occur when talking to the OKS provider API
#[derive(Debug, Error)]
pub enum OksError {
    /// HTTP transport error (connection refused, TLS, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("OKS API error: {status} - {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Credentials rejected (401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
