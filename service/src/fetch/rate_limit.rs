//! Requests-per-second ceiling for the Congress.gov API.
//!
//! A token bucket: tokens refill continuously at the configured rate up to a
//! small burst capacity, and each request spends one.

use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RateLimitError {
    #[error("requests per second must be positive and finite, got {0}")]
    InvalidRate(f64),

    #[error("burst capacity cannot be 0")]
    InvalidBurst,

    #[error("no rate-limit capacity within {max_wait:?}")]
    WaitExceeded { max_wait: Duration },
}

/// Shared direct (un-keyed) limiter. Safe under concurrent callers; waiters
/// are not served in FIFO order.
pub struct RateLimiter {
    inner: DefaultDirectRateLimiter,
    requests_per_second: f64,
    burst: NonZeroU32,
    max_wait: Option<Duration>,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("requests_per_second", &self.requests_per_second)
            .field("burst", &self.burst)
            .field("max_wait", &self.max_wait)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    /// # Errors
    ///
    /// Returns [`RateLimitError::InvalidRate`] for a non-positive or
    /// non-finite rate and [`RateLimitError::InvalidBurst`] for a zero burst.
    pub fn new(
        requests_per_second: f64,
        burst: u32,
        max_wait: Option<Duration>,
    ) -> Result<Self, RateLimitError> {
        if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
            return Err(RateLimitError::InvalidRate(requests_per_second));
        }
        let burst = NonZeroU32::new(burst).ok_or(RateLimitError::InvalidBurst)?;
        let quota = Duration::try_from_secs_f64(1.0 / requests_per_second)
            .ok()
            .and_then(Quota::with_period)
            .ok_or(RateLimitError::InvalidRate(requests_per_second))?
            .allow_burst(burst);

        Ok(Self {
            inner: governor::RateLimiter::direct(quota),
            requests_per_second,
            burst,
            max_wait,
        })
    }

    /// Wait until one more request fits under the ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::WaitExceeded`] when a maximum wait is
    /// configured and no capacity frees up within it.
    pub async fn acquire(&self) -> Result<(), RateLimitError> {
        match self.max_wait {
            None => {
                self.inner.until_ready().await;
                Ok(())
            }
            Some(max_wait) => tokio::time::timeout(max_wait, self.inner.until_ready())
                .await
                .map_err(|_| RateLimitError::WaitExceeded { max_wait }),
        }
    }

    #[must_use]
    pub const fn requests_per_second(&self) -> f64 {
        self.requests_per_second
    }

    #[must_use]
    pub const fn burst(&self) -> u32 {
        self.burst.get()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(
            RateLimiter::new(0.0, 1, None),
            Err(RateLimitError::InvalidRate(_))
        ));
        assert!(matches!(
            RateLimiter::new(f64::NAN, 1, None),
            Err(RateLimitError::InvalidRate(_))
        ));
        assert!(matches!(
            RateLimiter::new(1.0, 0, None),
            Err(RateLimitError::InvalidBurst)
        ));
    }

    #[tokio::test]
    async fn test_burst_is_immediate() {
        let limiter = RateLimiter::new(1.0, 3, Some(Duration::from_millis(100)))
            .expect("valid rate");
        for _ in 0..3 {
            limiter.acquire().await.expect("should acquire");
        }
        assert_eq!(limiter.burst(), 3);
    }

    #[tokio::test]
    async fn test_wait_exceeded_when_bucket_is_empty() {
        let limiter = RateLimiter::new(0.5, 1, Some(Duration::from_millis(50)))
            .expect("valid rate");
        limiter.acquire().await.expect("should acquire");
        let err = limiter.acquire().await.expect_err("should be refused");
        assert_eq!(
            err,
            RateLimitError::WaitExceeded {
                max_wait: Duration::from_millis(50)
            }
        );
    }

    /// Concurrent callers never exceed rate × window + burst in any window.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sliding_window_ceiling() {
        const RATE: f64 = 40.0;
        const BURST: u32 = 2;
        let limiter = Arc::new(RateLimiter::new(RATE, BURST, None).expect("valid rate"));
        let grants = Arc::new(Mutex::new(Vec::new()));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let grants = Arc::clone(&grants);
                tokio::spawn(async move {
                    limiter.acquire().await.expect("should acquire");
                    grants.lock().expect("lock poisoned").push(Instant::now());
                })
            })
            .collect();
        for task in tasks {
            task.await.expect("task should not panic");
        }

        let mut grants = grants.lock().expect("lock poisoned").clone();
        grants.sort();
        assert_eq!(grants.len(), 16);

        let window = Duration::from_millis(200);
        // Slack of one token covers timer granularity at the window edges.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ceiling = (RATE * window.as_secs_f64()) as usize + BURST as usize + 1;
        for (i, start) in grants.iter().enumerate() {
            let in_window = grants[i..]
                .iter()
                .take_while(|t| t.duration_since(*start) < window)
                .count();
            assert!(
                in_window <= ceiling,
                "{in_window} grants within {window:?} (ceiling {ceiling})"
            );
        }
    }
}
