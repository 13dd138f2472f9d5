//! Request pacing for the TMDB v2.1 API.

use std::time::{Duration, Instant};

/// Default minimum interval between requests (~4 req/s).
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(250);

/// Single-tier limiter keeping a minimum gap between consecutive requests.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct MovieDbRateLimiter {
    /// Minimum interval between requests.
    min_interval: Duration,
    /// Last request timestamp.
    last_request: Option<Instant>,
}

impl MovieDbRateLimiter {
    /// Creates a new rate limiter with the given minimum interval.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Creates a new rate limiter with the default interval (250ms).
    pub(crate) const fn default_interval() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }

    /// Waits until the next request is allowed.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval.saturating_sub(elapsed)).await;
            }
        }

        self.last_request = Some(Instant::now());
    }
}
