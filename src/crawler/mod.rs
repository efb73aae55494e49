//! Website crawler module
//!
//! This module provides a polite, failure-isolating site crawler: URL
//! validation and canonicalization, a priority frontier, per-failure-class
//! circuit breakers, adaptive per-host rate limiting, robots.txt compliance,
//! and HTML content extraction.

mod breaker;
mod config;
mod error;
mod extract;
mod fetch;
mod frontier;
mod limiter;
mod robots;
mod scheduler;
mod validator;

pub use breaker::{BreakerState, CircuitBreaker};
pub use config::{CrawlerConfig, CrawlerConfigBuilder};
pub use error::CrawlError;
pub use extract::{build_page_record, extract_links};
pub use fetch::PageFetcher;
pub use frontier::Frontier;
pub use limiter::AdaptiveRateLimiter;
pub use robots::RobotsPolicy;
pub use scheduler::{CrawlStatsSnapshot, crawl_site};
pub use validator::UrlValidator;

use serde::{Deserialize, Serialize};

/// A successfully fetched and parsed page. Immutable after creation;
/// consumed by summarization and, via its links, by the frontier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// URL of the page
    pub url: String,

    /// Page title, or "No Title"
    pub title: String,

    /// Cleaned line-based body text
    pub content: String,

    /// Outbound links discovered before content stripping
    pub links: Vec<String>,

    /// Whitespace-delimited word count of the cleaned content
    pub word_count: usize,
}

/// Everything one crawl produced: page records plus run statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    /// The seed URL the crawl started from
    pub base_url: String,

    /// Host the crawl was confined to
    pub domain: String,

    /// Successfully processed pages, in completion order
    pub pages: Vec<PageRecord>,

    /// Run counters
    pub stats: CrawlStatsSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_record_serializes_round_trip() {
        let record = PageRecord {
            url: "https://site.test/blog".to_string(),
            title: "Blog".to_string(),
            content: "Some content".to_string(),
            links: vec!["https://site.test/about".to_string()],
            word_count: 2,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: PageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.url, record.url);
        assert_eq!(back.word_count, 2);
    }
}
