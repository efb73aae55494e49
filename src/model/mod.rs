//! # LLM Client Module
//!
//! Unified client for the completion and embedding models the pipeline uses,
//! with built-in rate limiting to prevent API quota exhaustion.
//!
//! ## Key Components
//!
//! - `Client`: wraps a completion model and an embedding model behind one handle
//! - `RateLimitedCompletionModel` / `RateLimitedEmbeddingModel`: add a
//!   `governor` rate limiter in front of any `rig` model
//! - Mock models for tests that never touch the network

use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use rig::{completion::CompletionModel, embeddings::EmbeddingModel, providers::gemini};

pub mod mock_model;
pub mod ratelimited_completion;
pub mod ratelimited_embedding;

pub use ratelimited_completion::RateLimitedCompletionModel;
pub use ratelimited_embedding::RateLimitedEmbeddingModel;

#[derive(Debug, Clone)]
pub struct Client<C, E>
where
    C: CompletionModel,
    E: EmbeddingModel,
{
    completion_model: C,
    embedding_model: E,
}

pub struct RateLimitResponse<T> {
    #[allow(dead_code)]
    response: T,
}

impl
    Client<
        RateLimitedCompletionModel<gemini::completion::CompletionModel>,
        RateLimitedEmbeddingModel<gemini::embedding::EmbeddingModel>,
    >
{
    pub fn new_gemini_from_env() -> crate::error::Result<Self> {
        Ok(Self::new_gemini(gemini_client_from_env()?))
    }

    /// Like [`new_gemini_from_env`](Self::new_gemini_from_env) but with
    /// free-tier quotas.
    pub fn new_gemini_free_from_env() -> crate::error::Result<Self> {
        Ok(Self::new_gemini_free(gemini_client_from_env()?))
    }

    pub fn new_gemini(gemini_client: gemini::Client) -> Self {
        let completion_limiter = RateLimiter::direct(Quota::per_minute(
            NonZeroU32::new(2000).expect("must create rate limit"),
        ));
        let embedding_limiter = RateLimiter::direct(Quota::per_minute(
            NonZeroU32::new(1000).expect("must create rate limit"),
        ));
        let completion_model = RateLimitedCompletionModel::new(
            gemini_client.completion_model("gemini-2.0-flash"),
            completion_limiter,
        );
        let embedding_model = RateLimitedEmbeddingModel::new(
            gemini_client.embedding_model(gemini::embedding::EMBEDDING_004),
            embedding_limiter,
        );
        Self {
            completion_model,
            embedding_model,
        }
    }

    /// Free-tier quotas. Completion throughput is the binding constraint there.
    pub fn new_gemini_free(gemini_client: gemini::Client) -> Self {
        let completion_limiter = RateLimiter::direct(Quota::per_minute(
            NonZeroU32::new(30).expect("must create rate limit"),
        ));
        let embedding_limiter = RateLimiter::direct(Quota::per_minute(
            NonZeroU32::new(1000).expect("must create rate limit"),
        ));
        let completion_model = RateLimitedCompletionModel::new(
            gemini_client.completion_model("gemini-2.0-flash-lite"),
            completion_limiter,
        );
        let embedding_model = RateLimitedEmbeddingModel::new(
            gemini_client.embedding_model(gemini::embedding::EMBEDDING_004),
            embedding_limiter,
        );
        Self {
            completion_model,
            embedding_model,
        }
    }
}

fn gemini_client_from_env() -> crate::error::Result<gemini::Client> {
    let gemini_api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
        crate::error::Error::Auth("GEMINI_API_KEY environment variable must be set".to_string())
    })?;
    Ok(gemini::Client::new(&gemini_api_key))
}

impl<C, E> Client<C, E>
where
    C: CompletionModel,
    E: EmbeddingModel,
{
    pub fn from_models(completion_model: C, embedding_model: E) -> Self {
        Self {
            completion_model,
            embedding_model,
        }
    }

    pub fn completion(&self) -> &C {
        &self.completion_model
    }

    pub fn embedding(&self) -> &E {
        &self.embedding_model
    }
}
