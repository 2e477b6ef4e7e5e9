//! Bounded retry with exponential backoff.
//!
//! Every retry loop in the crate is driven by a [`RetryPolicy`]: attempt `n`
//! (1-based) is followed by a delay of `base_delay * 2^(n-1)`, capped at
//! `max_delay`. A `Retry-After` header sent by the API replaces the computed
//! delay, still capped at `max_delay`. After `max_attempts` the caller gives up
//! with a terminal error.

use std::time::Duration;

use reqwest::{Response, header::RETRY_AFTER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Search requests: 5 attempts, 250ms, 500ms, 1s, 2s between them.
    pub const fn search() -> Self {
        Self::new(5, Duration::from_millis(250), Duration::from_secs(8))
    }

    /// Playlist creation on 429: 5 attempts, 500ms doubling up to 8s.
    pub const fn create() -> Self {
        Self::new(5, Duration::from_millis(500), Duration::from_secs(8))
    }

    /// Batch appends: 5 attempts, 2s, 4s, 8s, 16s between them.
    pub const fn write() -> Self {
        Self::new(5, Duration::from_secs(2), Duration::from_secs(30))
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Same as [`delay_for`](Self::delay_for) but honors a server provided
    /// `Retry-After` (seconds).
    pub fn delay_after(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(wait) => wait.min(self.max_delay),
            None => self.delay_for(attempt),
        }
    }

    pub fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::search()
    }
}

pub fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
