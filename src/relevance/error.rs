//! Error types for the relevance pipeline

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for relevance pipeline operations
#[derive(Debug, Error)]
pub enum RelevanceError {
    /// Embedding request failed
    #[error("embedding error: {0}")]
    Embedding(#[from] rig::embeddings::EmbeddingError),

    /// Embedding response did not cover every input text
    #[error("embedding response incomplete: expected {expected}, got {got}")]
    IncompleteEmbeddings { expected: usize, got: usize },

    /// YouTube API failure that escaped per-unit handling
    #[error(transparent)]
    YouTube(#[from] crate::youtube::YouTubeError),
}

impl From<RelevanceError> for CrateError {
    fn from(err: RelevanceError) -> Self {
        match err {
            RelevanceError::YouTube(e) => e.into(),
            other => CrateError::Relevance(other.to_string()),
        }
    }
}
