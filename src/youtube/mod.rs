//! YouTube Data API v3 client
//!
//! A thin typed client over `search.list`, `videos.list`, and
//! `commentThreads.list`. Every call goes through the shared retry wrapper;
//! a 403 on a comment-thread fetch is reported as the expected
//! comments-disabled outcome rather than a failure.

mod error;
mod types;

pub use error::YouTubeError;
pub use types::{CandidateComment, CandidateVideo, SearchHit};

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::retry::{RetryPolicy, retry_with_backoff};
use types::{
    CommentThreadListResponse, SearchListResponse, VideoListResponse, VideoStatistics,
};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Comments requested per thread page
const COMMENTS_PAGE_SIZE: u32 = 100;

/// Typed client for the YouTube Data API.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl YouTubeClient {
    pub fn new(api_key: String, timeout: Duration, retry: RetryPolicy) -> Result<Self, YouTubeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            retry,
        })
    }

    /// Build a client from the `YOUTUBE_API_KEY` environment variable.
    /// A missing key is a fatal configuration error.
    pub fn from_env(timeout: Duration, retry: RetryPolicy) -> crate::error::Result<Self> {
        let api_key = std::env::var("YOUTUBE_API_KEY").map_err(|_| {
            crate::error::Error::Auth("YOUTUBE_API_KEY environment variable must be set".to_string())
        })?;
        Ok(Self::new(api_key, timeout, retry)?)
    }

    #[cfg(test)]
    pub fn set_base_url(&mut self, url: String) {
        self.base_url = url;
    }

    /// Run one search query, returning raw hits for topicality filtering.
    #[instrument(skip(self))]
    pub async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchHit>, YouTubeError> {
        let response: SearchListResponse = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("q", query),
                    ("type", "video"),
                    ("maxResults", &max_results.min(10).to_string()),
                    ("order", "relevance"),
                    ("regionCode", "US"),
                ],
                &format!("search('{}')", query),
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(SearchHit {
                    video_id,
                    title: item.snippet.title,
                    description: item.snippet.description,
                    channel_title: item.snippet.channel_title,
                })
            })
            .collect())
    }

    /// Fetch snippet and statistics for a batch of videos, sorted by view
    /// count descending.
    #[instrument(skip(self))]
    pub async fn fetch_video_details(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<CandidateVideo>, YouTubeError> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = video_ids.join(",");
        let response: VideoListResponse = self
            .get(
                "videos",
                &[("part", "snippet,statistics"), ("id", &ids)],
                "videos.list",
            )
            .await?;

        let mut videos: Vec<CandidateVideo> = response
            .items
            .into_iter()
            .map(|item| CandidateVideo {
                url: format!("https://youtu.be/{}", item.id),
                video_id: item.id,
                title: item.snippet.title,
                description: item.snippet.description,
                channel_title: item.snippet.channel_title,
                published_at: item.snippet.published_at,
                view_count: VideoStatistics::parse(&item.statistics.view_count),
                like_count: VideoStatistics::parse(&item.statistics.like_count),
                comment_count: VideoStatistics::parse(&item.statistics.comment_count),
            })
            .collect();

        videos.sort_by(|a, b| b.view_count.cmp(&a.view_count));
        Ok(videos)
    }

    /// Fetch the top-level comments of a video, relevance-ordered, as raw
    /// candidates for the filter chain.
    #[instrument(skip(self))]
    pub async fn fetch_comments(
        &self,
        video_id: &str,
    ) -> Result<Vec<CandidateComment>, YouTubeError> {
        let result: Result<CommentThreadListResponse, YouTubeError> = self
            .get(
                "commentThreads",
                &[
                    ("part", "snippet"),
                    ("videoId", video_id),
                    ("order", "relevance"),
                    ("maxResults", &COMMENTS_PAGE_SIZE.to_string()),
                    ("textFormat", "plainText"),
                ],
                &format!("commentThreads.list({})", video_id),
            )
            .await;

        let response = match result {
            Ok(response) => response,
            Err(YouTubeError::Api { status: 403, .. }) => {
                return Err(YouTubeError::CommentsDisabled {
                    video_id: video_id.to_string(),
                });
            }
            Err(err) => return Err(err),
        };

        Ok(response
            .items
            .into_iter()
            .map(|thread| {
                let snippet = thread.snippet.top_level_comment.snippet;
                CandidateComment {
                    text: normalize_whitespace(&snippet.text_display),
                    author: snippet
                        .author_display_name
                        .unwrap_or_else(|| "Anonymous".to_string()),
                    like_count: snippet.like_count,
                    published_at: snippet.published_at,
                }
            })
            .collect())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
        what: &str,
    ) -> Result<T, YouTubeError> {
        let url = format!("{}/{}", self.base_url, resource);
        retry_with_backoff(&self.retry, what, || {
            debug!("GET {} ({})", url, what);
            // build the request inside the closure so each attempt owns one
            let request = self
                .client
                .get(&url)
                .query(params)
                .query(&[("key", self.api_key.as_str())]);
            async move {
                let response = request.send().await?;
                let status = response.status();
                if status == StatusCode::OK {
                    let text = response.text().await?;
                    serde_json::from_str(&text)
                        .map_err(|e| YouTubeError::UnexpectedResponse(e.to_string()))
                } else {
                    let message = response.text().await.unwrap_or_default();
                    let truncated = message.chars().take(200).collect();
                    Err(YouTubeError::Api {
                        status: status.as_u16(),
                        message: truncated,
                    })
                }
            }
        })
        .await
    }
}

/// Collapse runs of whitespace; the API pads plain-text comments with
/// display artifacts.
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
