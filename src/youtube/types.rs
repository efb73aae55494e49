//! Wire types for the YouTube Data API v3 and the candidate records the
//! relevance pipeline consumes.

use serde::{Deserialize, Serialize};

// ---- API response shapes ----------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    pub id: SearchItemId,
    #[serde(default)]
    pub snippet: Snippet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchItemId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "channelTitle", default)]
    pub channel_title: String,
    #[serde(rename = "publishedAt", default)]
    pub published_at: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoItem {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub statistics: VideoStatistics,
}

/// The API serializes counters as strings.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct VideoStatistics {
    #[serde(rename = "viewCount", default)]
    pub view_count: Option<String>,
    #[serde(rename = "likeCount", default)]
    pub like_count: Option<String>,
    #[serde(rename = "commentCount", default)]
    pub comment_count: Option<String>,
}

impl VideoStatistics {
    pub fn parse(value: &Option<String>) -> u64 {
        value.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentThreadListResponse {
    #[serde(default)]
    pub items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentThread {
    pub snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentThreadSnippet {
    #[serde(rename = "topLevelComment")]
    pub top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopLevelComment {
    pub snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentSnippet {
    #[serde(rename = "textDisplay", default)]
    pub text_display: String,
    #[serde(rename = "authorDisplayName", default)]
    pub author_display_name: Option<String>,
    #[serde(rename = "likeCount", default)]
    pub like_count: u64,
    #[serde(rename = "publishedAt", default)]
    pub published_at: String,
}

// ---- Candidate records ------------------------------------------------------

/// A search hit carrying just enough metadata for the topicality filter.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
}

/// A video that passed topicality filtering, with full statistics.
/// Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateVideo {
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub channel_title: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub published_at: String,
}

/// One raw comment from a thread fetch. The filter chain either drops it or,
/// at the rerank stage, annotates it with a similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateComment {
    pub text: String,
    pub author: String,
    pub like_count: u64,
    pub published_at: String,
}
