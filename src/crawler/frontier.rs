//! The crawl frontier: discovered-but-unprocessed URLs
//!
//! Two ordered queues (priority, regular) plus the visited/failed sets live in
//! one state struct behind a single mutex. Every mutation is a short queue or
//! set operation; the lock is never held across network I/O. A normalized URL
//! is marked visited the moment it is dequeued, so it can never be returned
//! twice no matter how often it is re-enqueued.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use url::Url;

use crate::crawler::validator::UrlValidator;

#[derive(Debug, Default)]
struct FrontierState {
    priority_urls: VecDeque<String>,
    regular_urls: VecDeque<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    failed: HashSet<String>,
    pages_recorded: usize,
    urls_filtered: u64,
}

/// Priority-ordered frontier with visited-tracking keyed by normalized URL.
#[derive(Debug)]
pub struct Frontier {
    validator: UrlValidator,
    priority_threshold: u32,
    max_pages: usize,
    state: Mutex<FrontierState>,
}

impl Frontier {
    pub fn new(validator: UrlValidator, priority_threshold: u32, max_pages: usize) -> Self {
        Self {
            validator,
            priority_threshold,
            max_pages,
            state: Mutex::new(FrontierState::default()),
        }
    }

    /// Validate, normalize, and queue a URL. Invalid URLs are counted as
    /// filtered; URLs already seen in any capacity are skipped silently.
    /// Returns whether the URL was accepted.
    pub fn enqueue(&self, raw_url: &str, priority_hint: u32) -> bool {
        let Ok(url) = Url::parse(raw_url) else {
            self.state.lock().expect("frontier lock poisoned").urls_filtered += 1;
            return false;
        };

        if !self.validator.is_valid(&url) {
            self.state.lock().expect("frontier lock poisoned").urls_filtered += 1;
            return false;
        }

        let normalized = self.validator.normalize(&url);
        let priority = priority_hint + self.validator.priority(&url);

        let mut state = self.state.lock().expect("frontier lock poisoned");
        if state.visited.contains(&normalized)
            || state.failed.contains(&normalized)
            || state.queued.contains(&normalized)
        {
            return false;
        }

        state.queued.insert(normalized.clone());
        if priority >= self.priority_threshold {
            state.priority_urls.push_back(normalized);
        } else {
            state.regular_urls.push_back(normalized);
        }
        true
    }

    /// Next URL to process: priority queue first, then regular. Returns
    /// `None` once the page cap is reached, regardless of queued work.
    pub fn dequeue(&self) -> Option<String> {
        let mut state = self.state.lock().expect("frontier lock poisoned");
        if state.pages_recorded >= self.max_pages {
            return None;
        }

        let next = state
            .priority_urls
            .pop_front()
            .or_else(|| state.regular_urls.pop_front())?;
        state.queued.remove(&next);
        state.visited.insert(next.clone());
        Some(next)
    }

    /// Record that a page was successfully processed, counting toward the cap.
    pub fn record_page(&self) {
        self.state.lock().expect("frontier lock poisoned").pages_recorded += 1;
    }

    /// Mark a URL as failed so it is never re-queued.
    pub fn mark_failed(&self, normalized_url: &str) {
        let mut state = self.state.lock().expect("frontier lock poisoned");
        state.failed.insert(normalized_url.to_string());
    }

    /// Number of URLs waiting in both queues.
    pub fn queued_len(&self) -> usize {
        let state = self.state.lock().expect("frontier lock poisoned");
        state.priority_urls.len() + state.regular_urls.len()
    }

    /// Number of unique URLs handed out for processing.
    pub fn visited_len(&self) -> usize {
        self.state.lock().expect("frontier lock poisoned").visited.len()
    }

    /// URLs rejected by validation since the crawl started.
    pub fn filtered_count(&self) -> u64 {
        self.state.lock().expect("frontier lock poisoned").urls_filtered
    }

    /// Pages successfully processed so far.
    pub fn pages_recorded(&self) -> usize {
        self.state.lock().expect("frontier lock poisoned").pages_recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontier(max_pages: usize) -> Frontier {
        Frontier::new(UrlValidator::new("site.test"), 8, max_pages)
    }

    #[test]
    fn priority_urls_dequeue_first() {
        let f = frontier(10);
        assert!(f.enqueue("https://site.test/misc/x/y/z", 0));
        assert!(f.enqueue("https://site.test/blog/post", 0));

        assert_eq!(f.dequeue().unwrap(), "https://site.test/blog/post");
        assert_eq!(f.dequeue().unwrap(), "https://site.test/misc/x/y/z");
        assert!(f.dequeue().is_none());
    }

    #[test]
    fn same_normalized_url_is_dequeued_at_most_once() {
        let f = frontier(10);
        assert!(f.enqueue("https://site.test/page", 0));
        // same page, different spellings
        assert!(!f.enqueue("https://site.test/page/", 0));
        assert!(!f.enqueue("https://site.test/page#reviews", 0));
        assert!(!f.enqueue("https://site.test/page?utm_source=x", 0));

        assert_eq!(f.dequeue().unwrap(), "https://site.test/page");
        assert!(f.dequeue().is_none());

        // never re-queued after a visit either
        assert!(!f.enqueue("https://site.test/page", 0));
        assert!(f.dequeue().is_none());
    }

    #[test]
    fn failed_urls_are_never_requeued() {
        let f = frontier(10);
        f.mark_failed("https://site.test/broken");
        assert!(!f.enqueue("https://site.test/broken", 0));
        assert!(f.dequeue().is_none());
    }

    #[test]
    fn dequeue_stops_at_page_cap() {
        let f = frontier(1);
        f.enqueue("https://site.test/a", 0);
        f.enqueue("https://site.test/b", 0);

        assert!(f.dequeue().is_some());
        f.record_page();
        // cap reached: queued work remains but nothing is handed out
        assert!(f.queued_len() > 0);
        assert!(f.dequeue().is_none());
    }

    #[test]
    fn invalid_urls_count_as_filtered() {
        let f = frontier(10);
        assert!(!f.enqueue("https://other.test/page", 0));
        assert!(!f.enqueue("not a url", 0));
        assert!(!f.enqueue("https://site.test/file.pdf", 0));
        assert_eq!(f.filtered_count(), 3);
    }

    #[test]
    fn priority_hint_can_promote_a_url() {
        let f = frontier(10);
        // deep path alone scores below the threshold
        assert!(f.enqueue("https://site.test/one/two/three/four", 0));
        assert!(f.enqueue("https://site.test/five/six/seven/eight", 10));

        // the hinted URL jumped the queue
        assert_eq!(f.dequeue().unwrap(), "https://site.test/five/six/seven/eight");
    }
}
