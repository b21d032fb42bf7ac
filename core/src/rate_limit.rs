//! Minimum spacing between mutating requests.
//!
//! The remote service limits requests per credential, not per connection, so
//! one `RateLimiter` is created per credential set and handed to every
//! `ResourceClient` as an `Arc`. The check, the sleep and the update of the
//! last-permitted instant all happen under one lock: two callers can never
//! both observe an old timestamp and go out back to back.

use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::trace;

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_permitted: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_permitted: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Block until at least `min_interval` has passed since the previous
    /// permit, then return the instant this permit was granted.
    ///
    /// Callers are not queued in arrival order; whoever takes the lock next
    /// goes next.
    pub fn acquire(&self) -> Instant {
        // The guarded value is a plain timestamp, valid even after a panic.
        let mut last = self.last_permitted.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                trace!(?wait, "rate limit: waiting");
                thread::sleep(wait);
            }
        }

        let now = Instant::now();
        *last = Some(now);
        now
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
