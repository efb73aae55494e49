//! Semantic rerank of surviving comments against the research question

use rig::embeddings::EmbeddingModel;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::error::RelevanceError;
use crate::youtube::CandidateComment;

/// A comment that survived the filter chain, annotated with its similarity
/// to the question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredComment {
    #[serde(flatten)]
    pub comment: CandidateComment,
    pub similarity_score: f64,
}

/// Embed the question and each comment, score by cosine similarity, and keep
/// at most `max_comments` comments scoring at or above `min_similarity`,
/// sorted descending. An empty result is a valid outcome; the floor is never
/// relaxed.
#[instrument(skip_all, fields(candidates = comments.len()))]
pub async fn rerank<E: EmbeddingModel>(
    model: &E,
    question: &str,
    comments: Vec<CandidateComment>,
    min_similarity: f64,
    max_comments: usize,
) -> Result<Vec<ScoredComment>, RelevanceError> {
    if comments.is_empty() {
        return Ok(Vec::new());
    }

    let mut texts = Vec::with_capacity(comments.len() + 1);
    texts.push(question.to_string());
    texts.extend(comments.iter().map(|c| c.text.clone()));

    let embeddings = model.embed_texts(texts).await?;
    if embeddings.len() != comments.len() + 1 {
        return Err(RelevanceError::IncompleteEmbeddings {
            expected: comments.len() + 1,
            got: embeddings.len(),
        });
    }

    let question_vec = &embeddings[0].vec;
    let mut scored: Vec<ScoredComment> = comments
        .into_iter()
        .zip(embeddings[1..].iter())
        .map(|(comment, embedding)| ScoredComment {
            similarity_score: cosine_similarity(question_vec, &embedding.vec),
            comment,
        })
        .collect();

    scored.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.retain(|c| c.similarity_score >= min_similarity);
    scored.truncate(max_comments);
    Ok(scored)
}

/// Cosine similarity between two vectors. Zero when either vector has zero
/// magnitude.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mock_model::MockEmbeddingModel;

    fn comment(text: &str) -> CandidateComment {
        CandidateComment {
            text: text.to_string(),
            author: "a".to_string(),
            like_count: 0,
            published_at: String::new(),
        }
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.5, 0.5, 0.1];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn rerank_applies_floor_cap_and_ordering() {
        let model = MockEmbeddingModel::new(2);
        model.set_vector("q", vec![1.0, 0.0]).await;
        model.set_vector("close", vec![0.9, 0.1]).await;
        model.set_vector("mid", vec![0.5, 0.5]).await;
        model.set_vector("far", vec![0.0, 1.0]).await;

        let comments = vec![comment("far"), comment("mid"), comment("close")];
        let scored = rerank(&model, "q", comments, 0.25, 2).await.unwrap();

        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].comment.text, "close");
        assert_eq!(scored[1].comment.text, "mid");
        assert!(scored[0].similarity_score > scored[1].similarity_score);
        assert!(scored.iter().all(|c| c.similarity_score >= 0.25));
    }

    #[tokio::test]
    async fn empty_result_when_nothing_clears_the_floor() {
        let model = MockEmbeddingModel::new(2);
        model.set_vector("q", vec![1.0, 0.0]).await;
        model.set_vector("far", vec![0.0, 1.0]).await;

        let scored = rerank(&model, "q", vec![comment("far")], 0.25, 5)
            .await
            .unwrap();
        assert!(scored.is_empty());
    }

    #[tokio::test]
    async fn no_candidates_short_circuits() {
        let model = MockEmbeddingModel::new(2);
        let scored = rerank(&model, "q", Vec::new(), 0.25, 5).await.unwrap();
        assert!(scored.is_empty());
    }
}
