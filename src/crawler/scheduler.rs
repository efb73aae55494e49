//! The crawl loop: a bounded worker pool over the frontier
//!
//! Workers pull normalized URLs, apply robots rules and the adaptive limiter,
//! fetch under the matching circuit breaker, and feed discovered links back
//! into the frontier. The loop stops at the page cap, on frontier exhaustion,
//! or after too many consecutive failures against a broken site. Partial
//! results are always returned.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::crawler::breaker::CircuitBreaker;
use crate::crawler::config::CrawlerConfig;
use crate::crawler::error::CrawlError;
use crate::crawler::extract::build_page_record;
use crate::crawler::fetch::PageFetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::limiter::AdaptiveRateLimiter;
use crate::crawler::robots::RobotsPolicy;
use crate::crawler::validator::UrlValidator;
use crate::crawler::{CrawlReport, PageRecord};

/// Priority hint for the seed URL so it always lands in the priority queue
const SEED_PRIORITY: u32 = 10;

/// How long an idle worker waits before re-checking the frontier
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Counters accumulated over one crawl.
#[derive(Debug, Default)]
pub struct CrawlStats {
    pub requests_made: AtomicU64,
    pub errors_encountered: AtomicU64,
    pub rate_limit_hits: AtomicU64,
    pub circuit_breaker_trips: AtomicU64,
    pub robots_denied: AtomicU64,
}

/// Serializable snapshot of [`CrawlStats`] for reports and artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlStatsSnapshot {
    pub requests_made: u64,
    pub errors_encountered: u64,
    pub urls_filtered: u64,
    pub rate_limit_hits: u64,
    pub circuit_breaker_trips: u64,
    pub robots_denied: u64,
}

struct SchedulerInner {
    config: CrawlerConfig,
    host: String,
    frontier: Frontier,
    fetcher: PageFetcher,
    robots: RobotsPolicy,
    limiter: AdaptiveRateLimiter,
    server_breaker: CircuitBreaker,
    rate_limit_breaker: CircuitBreaker,
    pages: Mutex<Vec<PageRecord>>,
    stats: CrawlStats,
    consecutive_failures: AtomicU32,
    in_flight: AtomicUsize,
}

/// Crawl a website starting from `base_url` under the given configuration.
#[instrument(skip(config))]
pub async fn crawl_site(base_url: &str, config: CrawlerConfig) -> Result<CrawlReport, CrawlError> {
    let base = Url::parse(base_url)?;
    let host = base
        .host_str()
        .ok_or_else(|| CrawlError::Other(format!("URL has no host: {}", base_url)))?
        .to_string();

    let fetcher = PageFetcher::new(&config.user_agent, config.request_timeout())?;
    let robots = if config.respect_robots_txt {
        RobotsPolicy::load(fetcher.client(), &base).await
    } else {
        RobotsPolicy::default()
    };

    let validator = UrlValidator::new(&host);
    let frontier = Frontier::new(validator, config.priority_threshold, config.max_pages);
    frontier.enqueue(base.as_str(), SEED_PRIORITY);

    let inner = Arc::new(SchedulerInner {
        limiter: AdaptiveRateLimiter::new(config.min_delay()),
        server_breaker: CircuitBreaker::new(
            "server_error",
            config.server_error_threshold,
            Duration::from_secs(300),
        ),
        rate_limit_breaker: CircuitBreaker::new(
            "rate_limit",
            config.rate_limit_threshold,
            Duration::from_secs(600),
        ),
        host,
        frontier,
        fetcher,
        robots,
        pages: Mutex::new(Vec::new()),
        stats: CrawlStats::default(),
        consecutive_failures: AtomicU32::new(0),
        in_flight: AtomicUsize::new(0),
        config,
    });

    info!(
        "starting crawl of {} with {} workers, {} page cap",
        base_url, inner.config.max_workers, inner.config.max_pages
    );

    let workers: Vec<_> = (0..inner.config.max_workers.max(1))
        .map(|_| {
            let inner = Arc::clone(&inner);
            tokio::spawn(async move { worker_loop(inner).await })
        })
        .collect();

    for worker in workers {
        worker
            .await
            .map_err(|e| CrawlError::Other(format!("worker task failed: {}", e)))?;
    }

    let inner = Arc::try_unwrap(inner)
        .map_err(|_| CrawlError::Other("scheduler still shared after join".to_string()))?;
    let pages = inner.pages.into_inner().expect("pages lock poisoned");

    info!(
        "crawl finished: {} pages, {} requests, {} errors",
        pages.len(),
        inner.stats.requests_made.load(Ordering::Relaxed),
        inner.stats.errors_encountered.load(Ordering::Relaxed)
    );

    Ok(CrawlReport {
        base_url: base.to_string(),
        domain: inner.host,
        stats: CrawlStatsSnapshot {
            requests_made: inner.stats.requests_made.load(Ordering::Relaxed),
            errors_encountered: inner.stats.errors_encountered.load(Ordering::Relaxed),
            urls_filtered: inner.frontier.filtered_count(),
            rate_limit_hits: inner.stats.rate_limit_hits.load(Ordering::Relaxed),
            circuit_breaker_trips: inner.stats.circuit_breaker_trips.load(Ordering::Relaxed),
            robots_denied: inner.stats.robots_denied.load(Ordering::Relaxed),
        },
        pages,
    })
}

async fn worker_loop(inner: Arc<SchedulerInner>) {
    loop {
        if inner.consecutive_failures.load(Ordering::Relaxed)
            >= inner.config.max_consecutive_failures
        {
            warn!("too many consecutive failures, worker stopping");
            return;
        }

        let Some(url) = inner.frontier.dequeue() else {
            if inner.frontier.pages_recorded() >= inner.config.max_pages {
                return;
            }
            // another worker may still discover links
            if inner.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }
            tokio::time::sleep(IDLE_POLL).await;
            continue;
        };

        inner.in_flight.fetch_add(1, Ordering::SeqCst);
        process_url(&inner, &url).await;
        inner.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn process_url(inner: &SchedulerInner, url: &str) {
    let Ok(parsed) = Url::parse(url) else {
        inner.frontier.mark_failed(url);
        return;
    };

    if !inner.robots.allows(&parsed) {
        debug!("robots.txt disallows {}", url);
        inner.stats.robots_denied.fetch_add(1, Ordering::Relaxed);
        return;
    }

    inner.limiter.wait(&inner.host).await;

    match fetch_guarded(inner, url).await {
        Ok(html) => {
            let record = build_page_record(url, &html);
            for link in &record.links {
                inner.frontier.enqueue(link, 0);
            }
            debug!(
                "crawled {} ({} words, {} links)",
                url,
                record.word_count,
                record.links.len()
            );
            inner.pages.lock().expect("pages lock poisoned").push(record);
            inner.frontier.record_page();
            inner.limiter.on_success(&inner.host);
            inner.consecutive_failures.store(0, Ordering::Relaxed);
        }
        Err(CrawlError::NonHtml(content_type)) => {
            // policy rejection, not a failure
            debug!("skipping non-HTML {} ({})", url, content_type);
        }
        Err(err) => {
            inner.stats.errors_encountered.fetch_add(1, Ordering::Relaxed);
            inner.consecutive_failures.fetch_add(1, Ordering::Relaxed);
            inner.frontier.mark_failed(url);

            match &err {
                CrawlError::RateLimited => {
                    inner.stats.rate_limit_hits.fetch_add(1, Ordering::Relaxed);
                    inner.limiter.on_rate_limit(&inner.host);
                }
                CrawlError::CircuitOpen { class } => {
                    inner
                        .stats
                        .circuit_breaker_trips
                        .fetch_add(1, Ordering::Relaxed);
                    inner.limiter.on_circuit_trip(&inner.host);
                    debug!("circuit '{}' prevented request to {}", class, url);
                }
                _ => {}
            }
            warn!("failed to crawl {}: {}", url, err);
        }
    }
}

/// Fetch one URL under the per-class circuit breakers: 429s count against the
/// rate-limit breaker, other failures against the server-error breaker, so a
/// rate-limit storm does not suppress retries for unrelated errors.
async fn fetch_guarded(inner: &SchedulerInner, url: &str) -> Result<String, CrawlError> {
    inner.server_breaker.check()?;
    inner.rate_limit_breaker.check()?;

    inner.stats.requests_made.fetch_add(1, Ordering::Relaxed);
    match inner.fetcher.fetch(url).await {
        Ok(html) => {
            inner.server_breaker.record_success();
            inner.rate_limit_breaker.record_success();
            Ok(html)
        }
        Err(CrawlError::RateLimited) => {
            inner.rate_limit_breaker.record_failure();
            Err(CrawlError::RateLimited)
        }
        Err(err @ CrawlError::NonHtml(_)) => Err(err),
        Err(err) => {
            inner.server_breaker.record_failure();
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn test_config() -> CrawlerConfig {
        CrawlerConfig::builder()
            .max_pages(3)
            .max_workers(2)
            .min_delay_ms(1)
            .respect_robots_txt(false)
            .build()
    }

    fn page_body(links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|l| format!("<a href=\"{}\">link</a>", l))
            .collect();
        format!(
            "<html><head><title>Page</title></head><body><main>\
             <p>Some content with enough words to matter.</p>{}</main></body></html>",
            anchors
        )
    }

    #[tokio::test]
    async fn crawl_visits_same_domain_pages_only() {
        let mut server = Server::new_async().await;
        let base = server.url();

        let seed = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(page_body(&[
                "/blog/one",
                "/blog/two",
                "https://other.test/page",
                "/report.pdf",
            ]))
            .expect(1)
            .create_async()
            .await;
        let one = server
            .mock("GET", "/blog/one")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(page_body(&[]))
            .expect(1)
            .create_async()
            .await;
        let two = server
            .mock("GET", "/blog/two")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(page_body(&[]))
            .expect(1)
            .create_async()
            .await;
        // the cross-domain and .pdf links must never be requested
        let pdf = server
            .mock("GET", "/report.pdf")
            .expect(0)
            .create_async()
            .await;

        let report = crawl_site(&base, test_config()).await.unwrap();

        assert_eq!(report.pages.len(), 3);
        let urls: Vec<_> = report.pages.iter().map(|p| p.url.as_str()).collect();
        assert!(urls.iter().any(|u| u.ends_with("/blog/one")));
        assert!(urls.iter().any(|u| u.ends_with("/blog/two")));
        assert_eq!(report.stats.requests_made, 3);

        seed.assert_async().await;
        one.assert_async().await;
        two.assert_async().await;
        pdf.assert_async().await;
    }

    #[tokio::test]
    async fn crawl_respects_page_cap() {
        let mut server = Server::new_async().await;
        let base = server.url();

        // every page links to two more; without the cap this never ends
        for i in 0..10 {
            let next_a = format!("/p{}", i * 2 + 1);
            let next_b = format!("/p{}", i * 2 + 2);
            let path = if i == 0 {
                "/".to_string()
            } else {
                format!("/p{}", i)
            };
            server
                .mock("GET", path.as_str())
                .with_status(200)
                .with_header("content-type", "text/html")
                .with_body(page_body(&[&next_a, &next_b]))
                .create_async()
                .await;
        }

        let config = CrawlerConfig::builder()
            .max_pages(2)
            .max_workers(1)
            .min_delay_ms(1)
            .respect_robots_txt(false)
            .build();

        let report = crawl_site(&base, config).await.unwrap();
        assert_eq!(report.pages.len(), 2);
    }

    #[tokio::test]
    async fn crawl_survives_failures_and_returns_partial_results() {
        let mut server = Server::new_async().await;
        let base = server.url();

        server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(page_body(&["/good", "/broken"]))
            .create_async()
            .await;
        server
            .mock("GET", "/good")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(page_body(&[]))
            .create_async()
            .await;
        server
            .mock("GET", "/broken")
            .with_status(500)
            .create_async()
            .await;

        let report = crawl_site(&base, test_config()).await.unwrap();

        assert_eq!(report.pages.len(), 2);
        assert_eq!(report.stats.errors_encountered, 1);
    }

    #[tokio::test]
    async fn invalid_base_url_is_rejected() {
        let result = crawl_site("not a url", test_config()).await;
        assert!(matches!(result, Err(CrawlError::UrlParse(_))));
    }
}
