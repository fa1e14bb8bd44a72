//! Retry policy, backoff and the tagged outcome of a single fetch attempt.
//!
//! Every wait in the pipeline (backoff, rate limiting, politeness delay)
//! goes through a [`Pause`] implementation. Production code uses
//! [`TokioPause`]; unit tests substitute a recorder so waits are observed
//! rather than slept.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::Error;
use crate::config::FetchConfig;

/// Outcome of one request attempt.
///
/// The fetcher branches on this instead of on error classes: only
/// [`Attempt::RateLimited`] and [`Attempt::Retryable`] lead to another
/// attempt.
#[derive(Debug)]
pub enum Attempt {
    /// The server answered with a success status and this body.
    Success(String),
    /// The server answered `429`; wait this long before the next attempt.
    RateLimited {
        /// Wait taken from `Retry-After`, or the configured default.
        wait: Duration,
    },
    /// A transient failure; back off and try again.
    Retryable(Error),
    /// A failure that another attempt cannot fix.
    Fatal(Error),
}

/// Limits and delays for the retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt, doubled for each one after.
    pub base_delay: Duration,
    /// Upper bound on the un-jittered backoff delay.
    pub max_delay: Duration,
    /// Wait used when a `429` carries no usable `Retry-After`.
    pub default_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            default_retry_after: Duration::from_secs(config.default_retry_after_secs),
        }
    }
}

impl RetryPolicy {
    /// Un-jittered delay after the zero-based `attempt`: `min(base * 2^attempt, max)`.
    #[must_use]
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Jittered delay after `attempt`, scaled by a uniform factor in `[0.5, 1.0)`.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = rand::thread_rng().gen_range(0.5..1.0);
        self.backoff_ceiling(attempt).mul_f64(factor)
    }

    /// Interpret a `Retry-After` header value given in whole seconds.
    #[must_use]
    pub fn retry_after(&self, header: Option<&str>) -> Duration {
        header
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map_or(self.default_retry_after, Duration::from_secs)
    }
}

/// Something that can wait.
#[async_trait]
pub trait Pause: Send + Sync {
    /// Suspend for `duration`.
    async fn pause(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested waits and returns immediately.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct RecordingPause {
    waits: std::sync::Arc<std::sync::Mutex<Vec<Duration>>>,
}

#[cfg(test)]
impl RecordingPause {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits requested so far, in order.
    #[must_use]
    pub fn waits(&self) -> Vec<Duration> {
        self.waits
            .lock()
            .map(|waits| waits.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[async_trait]
impl Pause for RecordingPause {
    async fn pause(&self, duration: Duration) {
        if let Ok(mut waits) = self.waits.lock() {
            waits.push(duration);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            default_retry_after: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_backoff_doubles_until_capped() {
        let policy = policy();
        assert_eq!(policy.backoff_ceiling(0), Duration::from_secs(2));
        assert_eq!(policy.backoff_ceiling(1), Duration::from_secs(4));
        assert_eq!(policy.backoff_ceiling(3), Duration::from_secs(16));
        assert_eq!(policy.backoff_ceiling(4), Duration::from_secs(30));
        assert_eq!(policy.backoff_ceiling(40), Duration::from_secs(30));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let policy = policy();
        for attempt in 0..6 {
            let ceiling = policy.backoff_ceiling(attempt);
            for _ in 0..50 {
                let delay = policy.backoff_delay(attempt);
                assert!(delay >= ceiling / 2, "{delay:?} below half of {ceiling:?}");
                assert!(delay <= ceiling, "{delay:?} above {ceiling:?}");
            }
        }
    }

    #[test]
    fn test_retry_after_parsing() {
        let policy = policy();
        assert_eq!(policy.retry_after(Some("5")), Duration::from_secs(5));
        assert_eq!(policy.retry_after(Some(" 12 ")), Duration::from_secs(12));
        assert_eq!(policy.retry_after(None), Duration::from_secs(60));
        assert_eq!(
            policy.retry_after(Some("Wed, 21 Oct 2015 07:28:00 GMT")),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_policy_from_fetch_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(2));
        assert_eq!(policy.max_delay, Duration::from_secs(30));
        assert_eq!(policy.default_retry_after, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_recording_pause_collects_waits() {
        let pause = RecordingPause::new();
        pause.pause(Duration::from_millis(10)).await;
        pause.pause(Duration::from_secs(5)).await;
        assert_eq!(
            pause.waits(),
            vec![Duration::from_millis(10), Duration::from_secs(5)]
        );
    }
}
