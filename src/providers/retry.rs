//! Retry configuration and the shared retry loop.
//!
//! Generation failures are treated as transient: a network error and a
//! completion with no parseable JSON are handled the same way, by waiting a
//! fixed delay and asking again. By default there is no attempt limit, so
//! the loop only ends with a valid artifact; callers that need bounded
//! latency wrap the call in a timeout (as `casebookd` does) or set
//! [`RetryConfig::max_attempts`].
//!
//! A provider `retry-after` hint never shortens the fixed delay and only
//! lengthens it up to [`RetryConfig::max_delay`], which defaults to the
//! delay itself.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::telemetry;
use crate::{CasebookError, Result};

/// Default pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Configuration for retrying failed generations.
///
/// ```rust
/// # use casebook::providers::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(5)
///     .delay(Duration::from_millis(200));
/// assert_eq!(config.max_attempts, Some(5));
/// assert_eq!(
///     config.effective_delay(Some(Duration::from_secs(60))),
///     Duration::from_millis(200)
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first). `None` retries
    /// forever. Default: `None`.
    pub max_attempts: Option<u32>,
    /// Fixed delay between attempts. Default: 500ms.
    pub delay: Duration,
    /// Longest wait a provider `retry-after` hint may ask for. `None` caps
    /// hints at `delay`. Default: `None`.
    pub max_delay: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            delay: DEFAULT_RETRY_DELAY,
            max_delay: None,
        }
    }
}

impl RetryConfig {
    /// Create a new config: unbounded attempts, 500ms apart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of attempts (including the first). Zero is treated as one.
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n.max(1));
        self
    }

    /// Remove any attempt cap.
    pub fn unbounded(mut self) -> Self {
        self.max_attempts = None;
        self
    }

    /// Set the delay between attempts.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Allow provider `retry-after` hints to stretch the wait up to `max_delay`.
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Delay before the next attempt.
    ///
    /// A `retry_after` hint is clamped to `delay..=max_delay`.
    pub fn effective_delay(&self, retry_after: Option<Duration>) -> Duration {
        let ceiling = self.max_delay.unwrap_or(self.delay).max(self.delay);
        retry_after.map_or(self.delay, |hint| hint.clamp(self.delay, ceiling))
    }

    fn is_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Run `f` until it succeeds.
///
/// Every error is retried after [`RetryConfig::effective_delay`]. When an
/// attempt cap is configured and reached, the last error is wrapped in
/// [`CasebookError::RetriesExhausted`].
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, artifact: &str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        let err = match f().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if config.is_exhausted(attempts) {
            return Err(CasebookError::RetriesExhausted {
                operation: artifact.to_owned(),
                attempts,
                last: Box::new(err),
            });
        }

        let reason = if err.is_malformed_output() {
            "malformed"
        } else {
            "transport"
        };
        metrics::counter!(telemetry::RETRIES_TOTAL,
            "artifact" => artifact.to_owned(),
            "reason" => reason,
        )
        .increment(1);

        let delay = config.effective_delay(err.retry_after());
        warn!(
            artifact,
            attempt = attempts,
            reason,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "generation failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unbounded_with_fixed_delay() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, None);
        assert_eq!(config.delay, Duration::from_millis(500));
        assert!(!config.is_exhausted(u32::MAX));
    }

    #[test]
    fn retry_after_is_ignored_by_default() {
        let config = RetryConfig::new();
        assert_eq!(config.effective_delay(None), Duration::from_millis(500));
        assert_eq!(
            config.effective_delay(Some(Duration::from_secs(3600))),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn retry_after_is_clamped_to_max_delay() {
        let config = RetryConfig::new().max_delay(Duration::from_secs(5));
        assert_eq!(
            config.effective_delay(Some(Duration::from_secs(3))),
            Duration::from_secs(3)
        );
        assert_eq!(
            config.effective_delay(Some(Duration::from_secs(3600))),
            Duration::from_secs(5)
        );
        assert_eq!(
            config.effective_delay(Some(Duration::ZERO)),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn max_delay_below_delay_keeps_fixed_delay() {
        let config = RetryConfig::new().max_delay(Duration::from_millis(10));
        assert_eq!(
            config.effective_delay(Some(Duration::from_secs(60))),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn zero_attempts_clamps_to_one() {
        let config = RetryConfig::new().max_attempts(0);
        assert_eq!(config.max_attempts, Some(1));
        assert!(config.is_exhausted(1));
    }
}
