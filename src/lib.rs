//! # Brandscout - Marketing Research Crawler & Comment Miner
//!
//! This crate provides the two data-gathering halves of a marketing research
//! pipeline: a polite single-site crawler that turns a website into summarized
//! page records, and a YouTube comment pipeline that finds what real customers
//! say about a brand.
//!
//! ## Features
//!
//! - Bounded concurrent crawling with URL validation and canonicalization
//! - Per-failure-class circuit breakers and adaptive per-host rate limiting
//! - robots.txt compliance and HTML-only content extraction
//! - LLM page and site summaries with deterministic fallbacks
//! - Query expansion and video topicality filtering per brand
//! - Strictly eliminative comment quality, language, and keyword filters
//! - Semantic rerank of comments against the research question
//! - Async API with Tokio
//! - Robust error handling and logging
//!
//! ## Example
//!
//! ```rust,no_run
//! use brandscout::crawler::{CrawlerConfig, crawl_site};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CrawlerConfig::builder()
//!         .max_pages(25)
//!         .max_workers(2)
//!         .build();
//!
//!     let report = crawl_site("https://example.com", config).await?;
//!     println!("crawled {} pages", report.pages.len());
//!     Ok(())
//! }
//! ```

mod error;
pub mod retry;

pub mod artifacts;
pub mod crawler;
pub mod model;
pub mod relevance;
pub mod summarize;
pub mod youtube;

pub use error::Error;

/// Re-export of the crate error types for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
