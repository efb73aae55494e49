//! Shared retry discipline for external API calls
//!
//! Every remote call in the crate (YouTube API, page fetches, LLM requests)
//! goes through [`retry_with_backoff`]: only transient failures are retried,
//! with exponential backoff and jitter, and the last error is surfaced once
//! the attempt budget is exhausted. Callers treat an exhausted unit of work
//! (one query, one video, one page) as failed and move on.

use rand::{Rng, thread_rng};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Classifies an error as retryable or not.
///
/// Timeouts, connection failures, and 5xx-class statuses are transient;
/// auth and validation failures must propagate immediately.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for reqwest::Error {
    fn is_transient(&self) -> bool {
        if self.is_timeout() || self.is_connect() {
            return true;
        }
        self.status().is_some_and(|s| s.is_server_error())
    }
}

/// Retry budget and backoff shape for a call site.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles per retry
    pub base_delay: Duration,

    /// Upper bound on any single backoff sleep
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Backoff for the given zero-based attempt, with ±20% jitter so retries
    /// against the same host do not synchronize.
    fn backoff(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        let capped = exp.min(self.max_delay);
        let jitter_factor = thread_rng().gen_range(0.8..1.2);
        capped.mul_f64(jitter_factor)
    }
}

/// Run `op` up to `policy.max_attempts` times, sleeping between attempts.
///
/// Non-transient errors propagate on first occurrence. `what` names the call
/// for log lines.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, E>
where
    E: Transient + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    warn!(
                        "{} failed after {} attempts: {}",
                        what, policy.max_attempts, err
                    );
                    return Err(err);
                }
                let delay = policy.backoff(attempt - 1);
                warn!(
                    "{} transient error (attempt {}/{}), retrying in {:?}: {}",
                    what, attempt, policy.max_attempts, delay, err
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct TestError {
        transient: bool,
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test error (transient: {})", self.transient)
        }
    }

    impl Transient for TestError {
        fn is_transient(&self) -> bool {
            self.transient
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn retries_transient_until_success() {
        let calls = AtomicU32::new(0);
        let calls_ref = &calls;
        let result: Result<u32, TestError> =
            retry_with_backoff(&fast_policy(), "test op", || async move {
                let n = calls_ref.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(TestError { transient: true })
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_fails_immediately() {
        let calls = AtomicU32::new(0);
        let calls_ref = &calls;
        let result: Result<u32, TestError> =
            retry_with_backoff(&fast_policy(), "test op", || async move {
                calls_ref.fetch_add(1, Ordering::SeqCst);
                Err(TestError { transient: false })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_attempts_and_returns_last_error() {
        let calls = AtomicU32::new(0);
        let calls_ref = &calls;
        let result: Result<u32, TestError> =
            retry_with_backoff(&fast_policy(), "test op", || async move {
                calls_ref.fetch_add(1, Ordering::SeqCst);
                Err(TestError { transient: true })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn backoff_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(30),
        };
        // 10s * 2^5 = 320s before the cap; jitter stays within ±20% of 30s.
        let delay = policy.backoff(5);
        assert!(delay <= Duration::from_secs(36));
    }
}
