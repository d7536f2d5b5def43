//! Freshness and rate-limit policy.
//!
//! Two independent questions decide whether a cached entry is served:
//!
//! - *fresh*: `now - created_at < ttl`. The entry is still the canonical
//!   artifact for its slot.
//! - *rate limited*: `now - last_generated_at < window`. A generation just
//!   happened, so even a stale value is served rather than starting another.
//!
//! Missing entries are neither.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{CacheEntry, elapsed};

/// Default time an artifact stays canonical: 15 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Default window in which repeat requests reuse the last generation: 10 seconds.
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(10);

/// Default number of entry-point calls between sweeps.
pub const DEFAULT_SWEEP_EVERY: u64 = 50;

/// True iff `entry` exists and is younger than `ttl`.
pub fn is_fresh<T>(entry: Option<&CacheEntry<T>>, now: DateTime<Utc>, ttl: Duration) -> bool {
    entry.is_some_and(|e| elapsed(e.created_at, now) < ttl)
}

/// True iff `entry` exists and was generated less than `window` ago.
pub fn should_rate_limit<T>(
    entry: Option<&CacheEntry<T>>,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    entry.is_some_and(|e| elapsed(e.last_generated_at, now) < window)
}

/// Timing knobs for the cache.
///
/// ```rust
/// # use casebook::cache::CachePolicy;
/// # use std::time::Duration;
/// let policy = CachePolicy::new()
///     .ttl(Duration::from_secs(300))
///     .rate_limit_window(Duration::from_secs(5));
/// assert_eq!(policy.max_idle, Duration::from_secs(600));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    /// How long an artifact is treated as canonical. Default: 15 min.
    pub ttl: Duration,
    /// How soon after a generation repeat requests are collapsed. Default: 10 s.
    pub rate_limit_window: Duration,
    /// Sweep on every N-th entry-point call. Default: 50.
    pub sweep_every: u64,
    /// Entries not served for longer than this are evicted. Default: 2 × ttl.
    pub max_idle: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
            sweep_every: DEFAULT_SWEEP_EVERY,
            max_idle: DEFAULT_TTL * 2,
        }
    }
}

impl CachePolicy {
    /// Create a policy with the default timings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL. Also resets `max_idle` to twice the new TTL.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self.max_idle = ttl * 2;
        self
    }

    /// Set the rate-limit window.
    pub fn rate_limit_window(mut self, window: Duration) -> Self {
        self.rate_limit_window = window;
        self
    }

    /// Set the sweep cadence. Zero is clamped to one (sweep every call).
    pub fn sweep_every(mut self, n: u64) -> Self {
        self.sweep_every = n.max(1);
        self
    }

    /// Set the eviction idle time explicitly.
    pub fn max_idle(mut self, max_idle: Duration) -> Self {
        self.max_idle = max_idle;
        self
    }

    /// [`is_fresh`] with this policy's TTL.
    pub fn is_fresh<T>(&self, entry: Option<&CacheEntry<T>>, now: DateTime<Utc>) -> bool {
        is_fresh(entry, now, self.ttl)
    }

    /// [`should_rate_limit`] with this policy's window.
    pub fn should_rate_limit<T>(&self, entry: Option<&CacheEntry<T>>, now: DateTime<Utc>) -> bool {
        should_rate_limit(entry, now, self.rate_limit_window)
    }

    /// Whether a cached entry may be served instead of regenerating.
    pub fn can_serve<T>(&self, entry: &CacheEntry<T>, now: DateTime<Utc>) -> bool {
        self.is_fresh(Some(entry), now) || self.should_rate_limit(Some(entry), now)
    }

    /// Whether an entry has gone unserved long enough to evict.
    pub fn is_idle<T>(&self, entry: &CacheEntry<T>, now: DateTime<Utc>) -> bool {
        entry.idle(now) > self.max_idle
    }
}
