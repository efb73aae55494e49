//! Circuit breaker for failing endpoints
//!
//! Each failure class (server errors, rate limits) gets its own breaker so a
//! storm of one kind does not suppress retries of another. The breaker is
//! owned by the scheduler, never process-global; the state lock is never held
//! across the guarded operation.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use crate::crawler::error::CrawlError;

/// Breaker states: normal, fail-fast, and single-trial recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// A stateful guard that stops calling a failing operation until a cooldown
/// elapses.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    recovery_timeout: Duration,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(name: &str, failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            failure_threshold,
            recovery_timeout,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                failure_count: 0,
                last_failure: None,
            }),
        }
    }

    /// Current state, resolving an elapsed open-cooldown to `HalfOpen`.
    pub fn state(&self) -> BreakerState {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");
        self.resolve_state(&mut inner);
        inner.state
    }

    /// Fail fast with [`CrawlError::CircuitOpen`] while the breaker is open.
    /// Callers that pass the check must report the outcome via
    /// [`record_success`](Self::record_success) or
    /// [`record_failure`](Self::record_failure).
    pub fn check(&self) -> Result<(), CrawlError> {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");
        self.resolve_state(&mut inner);
        if inner.state == BreakerState::Open {
            return Err(CrawlError::CircuitOpen {
                class: self.name.clone(),
            });
        }
        Ok(())
    }

    /// A successful call closes a half-open breaker and clears the counter.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");
        if inner.state == BreakerState::HalfOpen {
            inner.state = BreakerState::Closed;
        }
        inner.failure_count = 0;
    }

    /// A failure stamps the failure time; reaching the threshold (or failing
    /// the half-open trial) opens the breaker.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");
        inner.failure_count += 1;
        inner.last_failure = Some(Instant::now());
        if inner.state == BreakerState::HalfOpen || inner.failure_count >= self.failure_threshold {
            if inner.state != BreakerState::Open {
                warn!(
                    "circuit breaker '{}' opened after {} failures",
                    self.name, inner.failure_count
                );
            }
            inner.state = BreakerState::Open;
        }
    }

    /// Run `op` under this breaker. While open, fails fast with
    /// [`CrawlError::CircuitOpen`] without invoking `op`. The state lock is
    /// not held while `op` runs.
    pub async fn call<T, F, Fut>(&self, op: F) -> Result<T, CrawlError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CrawlError>>,
    {
        self.check()?;
        match op().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(err) => {
                self.record_failure();
                Err(err)
            }
        }
    }

    /// Move `Open` to `HalfOpen` once the recovery timeout has passed.
    fn resolve_state(&self, inner: &mut BreakerInner) {
        if inner.state == BreakerState::Open
            && let Some(last) = inner.last_failure
            && last.elapsed() >= self.recovery_timeout
        {
            inner.state = BreakerState::HalfOpen;
        }
    }
}
