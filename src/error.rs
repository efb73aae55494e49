//! Error types for the brandscout crate

use thiserror::Error;

/// Result type for brandscout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for brandscout operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Missing or invalid credentials
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Please retry after {retry_after_secs} seconds")]
    RateLimit {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// Invalid input at a pipeline boundary
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Web crawling error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Relevance pipeline error
    #[error("Relevance error: {0}")]
    Relevance(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
