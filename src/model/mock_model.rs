//! # Mock Models for Testing
//!
//! Provides a `MockCompletionModel` and a `MockEmbeddingModel` implementing the
//! `rig` model traits, so pipeline logic can be exercised without making API
//! calls. The embedding mock returns deterministic vectors keyed by input text.

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    embeddings::{Embedding, EmbeddingError, EmbeddingModel},
    one_or_many::OneOrMany,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A mock completion model for testing purposes.
/// It returns a predefined response or an error when `completion` is called.
#[derive(Debug, Clone)]
pub struct MockCompletionModel {
    response: Arc<Mutex<Option<OneOrMany<AssistantContent>>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockCompletionModel {
    /// Creates a new mock model that will return a default empty success response.
    pub fn new() -> Self {
        Self {
            response: Arc::new(Mutex::new(None)),
            fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Sets the response that the mock model should return.
    pub async fn set_response(&self, response: OneOrMany<AssistantContent>) {
        let mut guard = self.response.lock().await;
        *guard = Some(response);
    }

    /// Helper to create a simple text response.
    pub async fn set_text_response(&self, text: &str) {
        let response = OneOrMany::one(AssistantContent::text(text));
        self.set_response(response).await;
    }

    /// Makes every subsequent call fail with a provider error.
    pub async fn set_failing(&self) {
        let mut guard = self.fail.lock().await;
        *guard = true;
    }
}

impl Default for MockCompletionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        _completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        if *self.fail.lock().await {
            return Err(CompletionError::ProviderError(
                "mock completion failure".to_string(),
            ));
        }
        let response = {
            let guard = self.response.lock().await;
            guard.clone()
        };
        match response {
            Some(result) => Ok(CompletionResponse {
                choice: result,
                raw_response: "".to_string(),
            }),
            None => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text("")),
                raw_response: "".to_string(),
            }),
        }
    }
}

/// A mock embedding model returning vectors registered per input text.
/// Unregistered texts get a zero vector, which scores 0.0 under cosine
/// similarity and therefore falls below any positive floor.
#[derive(Debug, Clone)]
pub struct MockEmbeddingModel {
    vectors: Arc<Mutex<HashMap<String, Vec<f64>>>>,
    ndims: usize,
}

impl MockEmbeddingModel {
    pub fn new(ndims: usize) -> Self {
        Self {
            vectors: Arc::new(Mutex::new(HashMap::new())),
            ndims,
        }
    }

    pub async fn set_vector(&self, text: &str, vector: Vec<f64>) {
        let mut guard = self.vectors.lock().await;
        guard.insert(text.to_string(), vector);
    }
}

impl EmbeddingModel for MockEmbeddingModel {
    const MAX_DOCUMENTS: usize = 1024;

    fn ndims(&self) -> usize {
        self.ndims
    }

    async fn embed_texts(
        &self,
        texts: impl IntoIterator<Item = String> + Send,
    ) -> Result<Vec<Embedding>, EmbeddingError> {
        let guard = self.vectors.lock().await;
        Ok(texts
            .into_iter()
            .map(|text| {
                let vec = guard.get(&text).cloned().unwrap_or_else(|| vec![0.0; self.ndims]);
                Embedding {
                    document: text,
                    vec,
                }
            })
            .collect())
    }
}
