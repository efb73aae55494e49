//! Crawler configuration with a builder, mirroring the polite defaults the
//! crawl loop was tuned with.

use std::time::Duration;

/// Configuration for a site crawl
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum number of successfully processed pages
    pub max_pages: usize,

    /// Number of concurrent crawl workers
    pub max_workers: usize,

    /// Floor for the adaptive per-host delay, in milliseconds
    pub min_delay_ms: u64,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Whether to load and honor robots.txt
    pub respect_robots_txt: bool,

    /// Combined priority at or above which a URL enters the priority queue
    pub priority_threshold: u32,

    /// Stop after this many consecutive failed fetches
    pub max_consecutive_failures: u32,

    /// Failures before the server-error breaker opens
    pub server_error_threshold: u32,

    /// Failures before the rate-limit breaker opens
    pub rate_limit_threshold: u32,

    /// User agent sent with page requests
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            max_workers: 2,
            min_delay_ms: 2000,
            request_timeout_secs: 30,
            respect_robots_txt: true,
            priority_threshold: 8,
            max_consecutive_failures: 10,
            server_error_threshold: 5,
            rate_limit_threshold: 2,
            user_agent: concat!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
                "(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            )
            .to_string(),
        }
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// The adaptive delay floor as a Duration
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    /// The per-request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.config.max_workers = max_workers;
        self
    }

    pub fn min_delay_ms(mut self, min_delay_ms: u64) -> Self {
        self.config.min_delay_ms = min_delay_ms;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn respect_robots_txt(mut self, respect: bool) -> Self {
        self.config.respect_robots_txt = respect;
        self
    }

    pub fn priority_threshold(mut self, threshold: u32) -> Self {
        self.config.priority_threshold = threshold;
        self
    }

    pub fn max_consecutive_failures(mut self, max: u32) -> Self {
        self.config.max_consecutive_failures = max;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = CrawlerConfig::builder()
            .max_pages(3)
            .max_workers(4)
            .min_delay_ms(100)
            .respect_robots_txt(false)
            .build();

        assert_eq!(config.max_pages, 3);
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.min_delay(), Duration::from_millis(100));
        assert!(!config.respect_robots_txt);
        // untouched fields keep their defaults
        assert_eq!(config.priority_threshold, 8);
    }
}
