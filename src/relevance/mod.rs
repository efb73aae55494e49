//! Comment relevance pipeline
//!
//! Per (brand, question): expand search queries, find on-topic videos, pull
//! their comments through a strictly eliminative filter chain, and rerank the
//! survivors against the question by embedding similarity. Failures are scoped
//! to the smallest unit of work: a failed query, video, or comment batch is
//! logged and skipped, never aborting the brand.

mod config;
mod error;
mod filter;
mod query;
mod rerank;

pub use config::{DEFAULT_MIN_SIMILARITY, RelevanceConfig, RelevanceConfigBuilder};
pub use error::RelevanceError;
pub use filter::CommentFilter;
pub use query::{build_queries, extract_keywords, is_on_topic};
pub use rerank::{ScoredComment, cosine_similarity, rerank};

use rig::embeddings::EmbeddingModel;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::youtube::{CandidateVideo, YouTubeClient, YouTubeError};

/// Everything collected for one brand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorReport {
    pub brand: String,
    pub website: String,
    pub total_questions: usize,
    pub results: Vec<QuestionResult>,
}

/// The videos and comments found for a single research question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question: String,
    pub videos_found: usize,
    pub videos: Vec<VideoAnalysis>,
}

/// One analyzed video with its retained comments, best first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub video: CandidateVideo,
    pub top_comments: Vec<ScoredComment>,
    pub relevant_comments_count: usize,
}

/// The full per-brand pipeline. Generic over the embedding model so tests can
/// substitute a deterministic one.
pub struct RelevancePipeline<E: EmbeddingModel> {
    youtube: YouTubeClient,
    embedding: E,
    config: RelevanceConfig,
    filter: CommentFilter,
}

impl<E: EmbeddingModel> RelevancePipeline<E> {
    pub fn new(youtube: YouTubeClient, embedding: E, config: RelevanceConfig) -> Self {
        let filter = CommentFilter::new(&config);
        Self {
            youtube,
            embedding,
            config,
            filter,
        }
    }

    pub fn config(&self) -> &RelevanceConfig {
        &self.config
    }

    /// Run every question for one brand. Questions run sequentially; the
    /// caller may run independent brands concurrently.
    #[instrument(skip(self, questions), fields(questions = questions.len()))]
    pub async fn process_competitor(
        &self,
        brand: &str,
        website: &str,
        questions: &[String],
    ) -> CompetitorReport {
        info!("processing competitor: {}", brand);
        let mut results = Vec::with_capacity(questions.len());
        for (idx, question) in questions.iter().enumerate() {
            info!(
                "question {}/{}: {}",
                idx + 1,
                questions.len(),
                truncate(question, 100)
            );
            results.push(self.process_question(brand, website, question).await);
        }
        CompetitorReport {
            brand: brand.to_string(),
            website: website.to_string(),
            total_questions: questions.len(),
            results,
        }
    }

    async fn process_question(&self, brand: &str, website: &str, question: &str) -> QuestionResult {
        let queries = build_queries(&self.config, brand, website, question);
        let video_ids = self.search_on_topic(&queries, brand).await;
        let videos = match self.youtube.fetch_video_details(&video_ids).await {
            Ok(videos) => videos,
            Err(err) => {
                warn!("videos.list failed: {}", err);
                Vec::new()
            }
        };

        let question_keywords = extract_keywords(question);
        let mut analyses = Vec::with_capacity(videos.len());
        for video in videos {
            info!("video: {}", truncate(&video.title, 60));
            let top_comments = self
                .relevant_comments(&video.video_id, question, &question_keywords)
                .await;
            analyses.push(VideoAnalysis {
                relevant_comments_count: top_comments.len(),
                top_comments,
                video,
            });
        }

        QuestionResult {
            question: question.to_string(),
            videos_found: analyses.len(),
            videos: analyses,
        }
    }

    /// Run expanded queries until enough on-topic videos are found. When no
    /// expanded query yields anything, fall back to a plain brand search
    /// without the topicality gate.
    async fn search_on_topic(&self, queries: &[String], brand: &str) -> Vec<String> {
        let max = self.config.max_videos;
        let mut found = Vec::new();
        for query in queries {
            match self.youtube.search_videos(query, max as u32).await {
                Ok(hits) => {
                    for hit in hits {
                        if is_on_topic(&self.config, &hit, brand) {
                            found.push(hit.video_id);
                        }
                    }
                }
                Err(err) => {
                    warn!("search failed for '{}': {}", query, err);
                    continue;
                }
            }
            if found.len() >= max {
                break;
            }
        }

        if found.is_empty() {
            let fallback = format!("\"{}\" review", brand);
            match self.youtube.search_videos(&fallback, max as u32).await {
                Ok(hits) => found.extend(hits.into_iter().map(|h| h.video_id)),
                Err(err) => warn!("fallback search failed: {}", err),
            }
        }

        let mut seen = std::collections::HashSet::new();
        found.retain(|id| seen.insert(id.clone()));
        found.truncate(max);
        found
    }

    /// Fetch, filter, and rerank the comments of one video. Disabled comments
    /// and transient failures both yield an empty list.
    async fn relevant_comments(
        &self,
        video_id: &str,
        question: &str,
        question_keywords: &[String],
    ) -> Vec<ScoredComment> {
        let raw = match self.youtube.fetch_comments(video_id).await {
            Ok(comments) => comments,
            Err(YouTubeError::CommentsDisabled { .. }) => {
                info!("comments disabled for {}", video_id);
                return Vec::new();
            }
            Err(err) => {
                warn!("comments fetch failed for {}: {}", video_id, err);
                return Vec::new();
            }
        };

        let filtered: Vec<_> = raw
            .into_iter()
            .filter(|c| self.filter.passes(&c.text, question_keywords))
            .collect();
        if filtered.is_empty() {
            return Vec::new();
        }

        match rerank(
            &self.embedding,
            question,
            filtered,
            self.config.min_similarity,
            self.config.max_comments,
        )
        .await
        {
            Ok(scored) => scored,
            Err(err) => {
                warn!("similarity rerank failed for {}: {}", video_id, err);
                Vec::new()
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let prefix: String = s.chars().take(max).collect();
        format!("{}...", prefix)
    }
}
