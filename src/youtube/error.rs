//! Error types for the YouTube API client

use crate::error::Error as CrateError;
use crate::retry::Transient;
use thiserror::Error;

/// Error type for YouTube API operations
#[derive(Debug, Error)]
pub enum YouTubeError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("YouTube API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body, truncated
        message: String,
    },

    /// Comments are disabled or forbidden for the video; an expected outcome
    #[error("comments disabled for video {video_id}")]
    CommentsDisabled { video_id: String },

    /// Response body did not match the expected shape
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Transient for YouTubeError {
    fn is_transient(&self) -> bool {
        match self {
            YouTubeError::Http(e) => e.is_transient(),
            YouTubeError::Api { status, .. } => {
                matches!(*status, 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }
}

impl From<YouTubeError> for CrateError {
    fn from(err: YouTubeError) -> Self {
        match err {
            YouTubeError::Http(e) => CrateError::Http(e),
            YouTubeError::Api { status, message } => CrateError::Api {
                status_code: status,
                message,
            },
            _ => CrateError::Other(err.to_string()),
        }
    }
}
