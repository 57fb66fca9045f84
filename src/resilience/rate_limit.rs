//! Minimum-spacing rate limiting for the outbound request path.
//!
//! Unlike a token bucket there is no burst allowance: each permitted call
//! re-arms a single shared timestamp, and the next caller waits out whatever
//! remains of the configured interval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Spaces permitted calls at least `min_interval` apart.
///
/// One pacer is shared by all workers. The timestamp is read and re-armed in
/// short critical sections with the sleep outside the lock, so concurrent
/// waiters can observe the same "last call" and proceed together — per-caller
/// spacing is enforced, a global ceiling across N workers is not.
#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
    total_requests: AtomicU64,
    total_waited: AtomicU64,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
            total_requests: AtomicU64::new(0),
            total_waited: AtomicU64::new(0),
        }
    }

    /// Suspend until at least `min_interval` has elapsed since the previous
    /// permitted call, then re-arm the shared timestamp.
    pub async fn wait(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        let remaining = {
            let last = self.last_request.lock().unwrap();
            last.and_then(|prev| self.min_interval.checked_sub(prev.elapsed()))
        };

        if let Some(delay) = remaining {
            if !delay.is_zero() {
                self.total_waited.fetch_add(1, Ordering::Relaxed);
                tokio::time::sleep(delay).await;
            }
        }

        *self.last_request.lock().unwrap() = Some(Instant::now());
    }

    /// Counters since construction.
    pub fn stats(&self) -> PacerStats {
        PacerStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            total_waited: self.total_waited.load(Ordering::Relaxed),
        }
    }
}

/// Statistics for the pacer.
#[derive(Debug, Clone, Copy)]
pub struct PacerStats {
    pub total_requests: u64,
    /// How many calls had to sleep before being permitted.
    pub total_waited: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_call_is_immediate() {
        let pacer = RequestPacer::new(Duration::from_millis(200));
        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(100));

        let stats = pacer.stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.total_waited, 0);
    }

    #[tokio::test]
    async fn back_to_back_calls_are_spaced() {
        let pacer = RequestPacer::new(Duration::from_millis(50));
        let start = Instant::now();
        pacer.wait().await;
        pacer.wait().await;
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(100));

        let stats = pacer.stats();
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.total_waited, 2);
    }

    #[tokio::test]
    async fn elapsed_interval_skips_the_wait() {
        let pacer = RequestPacer::new(Duration::from_millis(10));
        pacer.wait().await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(10));
        assert_eq!(pacer.stats().total_waited, 0);
    }
}
