//! Page fetching with typed failure classes
//!
//! The fetcher distinguishes rate-limit responses from server errors so the
//! scheduler can route each through the correct breaker and backoff path.
//! SSL verification is disabled for compatibility with sites presenting
//! marginal certificates.

use reqwest::{Client, StatusCode, header};
use std::time::Duration;
use tracing::debug;

use crate::crawler::error::CrawlError;

/// HTTP page fetcher with a browser-like header set.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CrawlError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(header::CONNECTION, header::HeaderValue::from_static("keep-alive"));
        headers.insert(
            header::UPGRADE_INSECURE_REQUESTS,
            header::HeaderValue::from_static("1"),
        );
        headers.insert(header::DNT, header::HeaderValue::from_static("1"));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { client })
    }

    /// Underlying client, shared with the robots.txt loader.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetch one page. Returns the HTML body, or a typed error: 429 maps to
    /// [`CrawlError::RateLimited`], 5xx-class to [`CrawlError::ServerError`],
    /// and non-HTML responses to [`CrawlError::NonHtml`].
    pub async fn fetch(&self, url: &str) -> Result<String, CrawlError> {
        debug!("fetching {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CrawlError::RateLimited);
        }
        // covers 500/502/503/504 and nonstandard origin statuses like 522
        if status.is_server_error() {
            return Err(CrawlError::ServerError {
                status: status.as_u16(),
            });
        }
        let response = response.error_for_status()?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        if !content_type.contains("text/html") {
            return Err(CrawlError::NonHtml(content_type));
        }

        Ok(response.text().await?)
    }
}
