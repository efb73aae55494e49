//! Error types for the crawler module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server responded 429; drives the aggressive backoff path
    #[error("rate limited by server")]
    RateLimited,

    /// 5xx-class response; counts against the server-error breaker
    #[error("server error ({status})")]
    ServerError {
        /// HTTP status code
        status: u16,
    },

    /// Breaker refused the call without touching the network
    #[error("circuit breaker is open for '{class}'")]
    CircuitOpen {
        /// Failure class whose breaker tripped
        class: String,
    },

    /// Response was not HTML and was discarded
    #[error("non-HTML content type: {0}")]
    NonHtml(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Http(e) => CrateError::Http(e),
            CrawlError::UrlParse(e) => CrateError::InvalidInput(format!("URL parse error: {}", e)),
            _ => CrateError::Crawl(err.to_string()),
        }
    }
}
