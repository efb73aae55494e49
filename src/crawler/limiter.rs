//! Adaptive per-host rate limiting
//!
//! Couples server feedback directly to future pacing: successes decay the
//! delay toward a floor, 429 responses double it, circuit-breaker trips apply
//! a gentler increase. State is keyed by host and guarded by a lock that is
//! never held across the enforced wait.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// Ceiling for the delay after repeated 429 responses
const MAX_RATE_LIMIT_DELAY: Duration = Duration::from_secs(15);

/// Ceiling for the delay after circuit-breaker trips
const MAX_TRIP_DELAY: Duration = Duration::from_secs(10);

/// Multiplier applied on success, pulling the delay back toward the floor
const DECAY_FACTOR: f64 = 0.9;

/// Multiplier applied on a rate-limit response
const RATE_LIMIT_FACTOR: f64 = 2.0;

/// Multiplier applied when a circuit breaker trips
const TRIP_FACTOR: f64 = 1.5;

#[derive(Debug)]
struct HostPacing {
    /// The earliest a later request may be sent; reserved under the lock so
    /// concurrent waiters queue up rather than bunching.
    next_slot: Instant,
    current_delay: Duration,
}

/// Paces outbound requests per host with a delay that adapts to server
/// feedback.
#[derive(Debug)]
pub struct AdaptiveRateLimiter {
    min_delay: Duration,
    hosts: Mutex<HashMap<String, HostPacing>>,
}

impl AdaptiveRateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Block until at least the host's current delay has elapsed since the
    /// previous request to it.
    pub async fn wait(&self, host: &str) {
        let slot = {
            let mut hosts = self.hosts.lock().expect("limiter lock poisoned");
            let now = Instant::now();
            let pacing = hosts.entry(host.to_string()).or_insert(HostPacing {
                next_slot: now,
                current_delay: self.min_delay,
            });
            let slot = pacing.next_slot.max(now);
            pacing.next_slot = slot + pacing.current_delay;
            slot
        };
        sleep_until(slot).await;
    }

    /// Decay the host's delay toward the floor after a successful request.
    pub fn on_success(&self, host: &str) {
        self.adjust(host, |delay, min| delay.mul_f64(DECAY_FACTOR).max(min));
    }

    /// Back off hard after the server reported a rate limit.
    pub fn on_rate_limit(&self, host: &str) {
        self.adjust(host, |delay, _| {
            delay.mul_f64(RATE_LIMIT_FACTOR).min(MAX_RATE_LIMIT_DELAY)
        });
    }

    /// Back off moderately after a circuit breaker refused the call.
    pub fn on_circuit_trip(&self, host: &str) {
        self.adjust(host, |delay, _| delay.mul_f64(TRIP_FACTOR).min(MAX_TRIP_DELAY));
    }

    /// The host's current delay, for statistics.
    pub fn current_delay(&self, host: &str) -> Duration {
        let hosts = self.hosts.lock().expect("limiter lock poisoned");
        hosts
            .get(host)
            .map_or(self.min_delay, |pacing| pacing.current_delay)
    }

    fn adjust(&self, host: &str, f: impl FnOnce(Duration, Duration) -> Duration) {
        let mut hosts = self.hosts.lock().expect("limiter lock poisoned");
        let now = Instant::now();
        let pacing = hosts.entry(host.to_string()).or_insert(HostPacing {
            next_slot: now,
            current_delay: self.min_delay,
        });
        pacing.current_delay = f(pacing.current_delay, self.min_delay);
        debug!(
            "host {} pacing adjusted to {:?}",
            host, pacing.current_delay
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn consecutive_calls_are_spaced_by_min_delay() {
        let limiter = AdaptiveRateLimiter::new(Duration::from_secs(2));

        let start = Instant::now();
        limiter.wait("site.test").await;
        limiter.wait("site.test").await;

        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn hosts_are_paced_independently() {
        let limiter = AdaptiveRateLimiter::new(Duration::from_secs(5));

        let start = Instant::now();
        limiter.wait("a.test").await;
        limiter.wait("b.test").await;

        // first request to each host goes out immediately
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_doubles_delay_up_to_ceiling() {
        let limiter = AdaptiveRateLimiter::new(Duration::from_secs(2));
        limiter.wait("site.test").await;

        limiter.on_rate_limit("site.test");
        assert_eq!(limiter.current_delay("site.test"), Duration::from_secs(4));

        for _ in 0..10 {
            limiter.on_rate_limit("site.test");
        }
        assert_eq!(limiter.current_delay("site.test"), MAX_RATE_LIMIT_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn success_decays_toward_floor() {
        let limiter = AdaptiveRateLimiter::new(Duration::from_secs(2));
        limiter.wait("site.test").await;
        limiter.on_rate_limit("site.test");

        for _ in 0..50 {
            limiter.on_success("site.test");
        }
        assert_eq!(limiter.current_delay("site.test"), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn circuit_trip_increase_is_smaller_than_rate_limit() {
        let limiter = AdaptiveRateLimiter::new(Duration::from_secs(2));
        limiter.wait("site.test").await;

        limiter.on_circuit_trip("site.test");
        assert_eq!(limiter.current_delay("site.test"), Duration::from_secs(3));
    }
}
