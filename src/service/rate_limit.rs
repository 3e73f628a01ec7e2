//! Per-client request rate limiting

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Rate limiter capability injected into the service
pub trait RateLimiter: Send + Sync {
    /// Record a request from `client` at `now`, or return how long to wait
    fn check_and_record(&self, client: &str, now: Instant) -> Result<(), Duration>;
}

/// Allows one request per client per fixed interval
#[derive(Debug)]
pub struct IntervalRateLimiter {
    interval: Duration,
    last_seen: Mutex<HashMap<String, Instant>>,
}

impl IntervalRateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of clients currently inside their interval
    pub fn tracked_clients(&self) -> usize {
        self.last_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl RateLimiter for IntervalRateLimiter {
    fn check_and_record(&self, client: &str, now: Instant) -> Result<(), Duration> {
        let mut last_seen = self
            .last_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(previous) = last_seen.get(client) {
            let elapsed = now.saturating_duration_since(*previous);
            if elapsed < self.interval {
                return Err(self.interval - elapsed);
            }
        }

        // Entries past the interval can no longer reject anything
        let interval = self.interval;
        last_seen.retain(|_, seen| now.saturating_duration_since(*seen) < interval);
        last_seen.insert(client.to_string(), now);
        Ok(())
    }
}

/// Accepts every request
#[derive(Debug, Default)]
pub struct Unlimited;

impl RateLimiter for Unlimited {
    fn check_and_record(&self, _client: &str, _now: Instant) -> Result<(), Duration> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_request_inside_interval_is_rejected() {
        let limiter = IntervalRateLimiter::new(Duration::from_secs(30));
        let start = Instant::now();

        assert!(limiter.check_and_record("10.0.0.1", start).is_ok());

        let retry = limiter
            .check_and_record("10.0.0.1", start + Duration::from_secs(10))
            .unwrap_err();
        assert_eq!(retry, Duration::from_secs(20));

        assert!(limiter
            .check_and_record("10.0.0.1", start + Duration::from_secs(30))
            .is_ok());
    }

    #[test]
    fn rejected_requests_do_not_reset_the_window() {
        let limiter = IntervalRateLimiter::new(Duration::from_secs(30));
        let start = Instant::now();

        limiter.check_and_record("a", start).unwrap();
        limiter
            .check_and_record("a", start + Duration::from_secs(29))
            .unwrap_err();
        assert!(limiter
            .check_and_record("a", start + Duration::from_secs(31))
            .is_ok());
    }

    #[test]
    fn clients_are_independent() {
        let limiter = IntervalRateLimiter::new(Duration::from_secs(30));
        let now = Instant::now();
        assert!(limiter.check_and_record("a", now).is_ok());
        assert!(limiter.check_and_record("b", now).is_ok());
        assert!(limiter.check_and_record("a", now).is_err());
    }

    #[test]
    fn expired_clients_are_forgotten() {
        let limiter = IntervalRateLimiter::new(Duration::from_secs(30));
        let start = Instant::now();

        for i in 0..100 {
            limiter.check_and_record(&format!("client-{}", i), start).unwrap();
        }
        assert_eq!(limiter.tracked_clients(), 100);

        limiter
            .check_and_record("late", start + Duration::from_secs(31))
            .unwrap();
        assert_eq!(limiter.tracked_clients(), 1);
        assert!(limiter
            .check_and_record("client-0", start + Duration::from_secs(32))
            .is_ok());
    }

    #[test]
    fn unlimited_accepts_everything() {
        let now = Instant::now();
        for _ in 0..5 {
            assert!(Unlimited.check_and_record("a", now).is_ok());
        }
    }
}
