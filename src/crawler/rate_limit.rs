//! Request pacing for the remote catalogue service
//!
//! A single limiter is shared by every outbound call of a crawl. It enforces
//! a minimum spacing between the moment one call is released and the moment
//! the next one is, regardless of how many ids each call carries.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum-spacing rate limiter
///
/// Safe to share behind an `Arc`: waiters queue on an async mutex so
/// concurrent callers are released one `delay` apart.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    last_release: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter releasing at most one call per `delay`
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_release: Mutex::new(None),
        }
    }

    /// Creates a limiter from a delay in milliseconds
    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    /// The configured minimum spacing
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Suspends until at least `delay` has elapsed since the previous release
    ///
    /// The first call returns immediately.
    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }

        let mut last_release = self.last_release.lock().await;

        if let Some(remaining) = time_until_ready(*last_release, self.delay, Instant::now()) {
            tracing::trace!("Rate limiter sleeping {:?}", remaining);
            tokio::time::sleep(remaining).await;
        }

        *last_release = Some(Instant::now());
    }
}

/// Time left before the next call may be released, or `None` if ready now
fn time_until_ready(last: Option<Instant>, delay: Duration, now: Instant) -> Option<Duration> {
    let last = last?;
    let elapsed = now.saturating_duration_since(last);
    if elapsed < delay {
        Some(delay - elapsed)
    } else {
        None
    }
}
