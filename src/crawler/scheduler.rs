//! Scheduler for managing the crawl frontier and rate limiting
//!
//! This module handles:
//! - The FIFO frontier of URLs waiting to be fetched
//! - Enforcing a minimum delay between outbound requests
//!
//! The crawl is sequential: one request is in flight at a time, and the
//! rate limiter is consulted before every request.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// The normalized URL to fetch
    pub url: String,

    /// How many more link hops may be followed from this page
    pub remaining_depth: u32,
}

/// First-in, first-out queue of pages to crawl
///
/// Breadth-first order falls out of the FIFO discipline: every page at
/// distance `n` from the root is dequeued before any page at `n + 1`.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry at the back of the queue
    pub fn push(&mut self, entry: FrontierEntry) {
        self.queue.push_back(entry);
    }

    /// Takes the oldest entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    /// Returns the number of URLs in the frontier
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Enforces a fixed minimum interval between requests
///
/// No adaptive backoff: the interval is derived once from the configured
/// requests-per-second ceiling and applied to every request, whatever the
/// outcome of the previous one.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Creates a rate limiter for the given ceiling
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum request rate; must be positive
    pub fn new(requests_per_second: f64) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / requests_per_second),
            last_request: None,
        }
    }

    /// The minimum time between two requests
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed >= self.interval {
            None
        } else {
            Some(self.interval - elapsed)
        }
    }

    /// Waits until a request is allowed, then records it
    ///
    /// # Arguments
    ///
    /// * `cancel` - Token that aborts the wait
    ///
    /// # Returns
    ///
    /// * `true` - The caller may send its request now
    /// * `false` - The crawl was cancelled while waiting
    pub async fn throttle(&mut self, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }

        if let Some(wait) = self.time_until_next_request(Instant::now()) {
            tracing::trace!("Rate limiting: waiting {:?}", wait);
            tokio::select! {
                _ = cancel.cancelled() => return false,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        self.last_request = Some(Instant::now());
        true
    }
}
