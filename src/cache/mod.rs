//! Caching subsystem.
//!
//! Generated artifacts are expensive (seconds of model latency and real
//! money per call), so every entry point consults an in-memory cache first.
//! Two stores plus one sweeper make up the subsystem:
//!
//! - [`SessionStore`] — one [`SessionBundle`] per session id, holding at most
//!   one detective case and one audit case.
//!
//! - [`OptionsStore`] — rectification option sets keyed on session *and* the
//!   content of the case they were generated for (see [`options_key`]), so a
//!   regenerated case never sees options meant for its predecessor.
//!
//! - [`Sweeper`] — counts entry-point calls and performs a full eviction scan
//!   of both stores every N-th call. No background task is involved.
//!
//! Whether a cached entry may be served is decided by the pure functions in
//! [`freshness`]: an entry is served while *fresh* (younger than the TTL) or
//! while *rate limited* (generated within the last few seconds), the latter
//! collapsing bursts of identical requests into a single generation.
//!
//! This is a best-effort, single-process cache. Nothing is persisted and two
//! concurrent misses for the same slot both generate; the last write wins.

pub mod freshness;
pub mod options;
pub mod session;
pub mod sweep;

pub use freshness::{CachePolicy, is_fresh, should_rate_limit};
pub use options::{OptionSet, OptionsStore, options_key};
pub use session::{ANONYMOUS_SESSION, SessionBundle, SessionSlot, SessionStore, session_key};
pub use sweep::{SweepReport, Sweeper};

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated value plus the timestamps the cache policy runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached artifact.
    pub data: T,
    /// When this value was first produced.
    pub created_at: DateTime<Utc>,
    /// When generation last ran for this slot.
    pub last_generated_at: DateTime<Utc>,
    /// When the entry was last returned to a caller.
    pub last_served_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Wrap freshly generated data; all timestamps are `now`.
    pub fn new(data: T, now: DateTime<Utc>) -> Self {
        Self {
            data,
            created_at: now,
            last_generated_at: now,
            last_served_at: now,
        }
    }

    /// Record a cache hit.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_served_at = now;
    }

    /// Time since the value was created.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        elapsed(self.created_at, now)
    }

    /// Time since the entry was last served.
    pub fn idle(&self, now: DateTime<Utc>) -> Duration {
        elapsed(self.last_served_at, now)
    }
}

/// `now - then`, saturating at zero when the clock went backwards.
pub(crate) fn elapsed(then: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - then).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_has_equal_timestamps() {
        let now = Utc::now();
        let entry = CacheEntry::new("case", now);
        assert_eq!(entry.created_at, now);
        assert_eq!(entry.last_generated_at, now);
        assert_eq!(entry.last_served_at, now);
    }

    #[test]
    fn touch_only_moves_last_served() {
        let then = Utc::now();
        let mut entry = CacheEntry::new(1, then);
        let later = then + chrono::Duration::seconds(30);
        entry.touch(later);
        assert_eq!(entry.created_at, then);
        assert_eq!(entry.last_generated_at, then);
        assert_eq!(entry.last_served_at, later);
        assert_eq!(entry.age(later), Duration::from_secs(30));
        assert_eq!(entry.idle(later), Duration::ZERO);
    }

    #[test]
    fn negative_age_saturates() {
        let now = Utc::now();
        let entry = CacheEntry::new((), now + chrono::Duration::seconds(5));
        assert_eq!(entry.age(now), Duration::ZERO);
    }
}
