//! Counter-gated eviction sweeps.
//!
//! Every artifact entry point calls [`Sweeper::maybe_sweep`] first. The call
//! bumps a shared counter and, on every `every`-th call, scans both stores:
//! session slots and option sets not served within `max_idle` are dropped,
//! and sessions with no slots left are removed. Amortised cost is O(1) per
//! call with an O(n) scan every N calls, and no timer task is needed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{OptionsStore, SessionStore};
use crate::telemetry;

/// What a sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Detective/audit slots dropped for idleness.
    pub slots_evicted: usize,
    /// Session bundles removed because both slots were empty.
    pub sessions_removed: usize,
    /// Option sets removed for idleness.
    pub options_evicted: usize,
}

/// Shared call counter that decides when to sweep.
#[derive(Debug)]
pub struct Sweeper {
    calls: AtomicU64,
    every: u64,
}

impl Sweeper {
    /// Sweep on every `every`-th call (clamped to at least 1).
    pub fn new(every: u64) -> Self {
        Self {
            calls: AtomicU64::new(0),
            every: every.max(1),
        }
    }

    /// Count a call. Returns true when this call should sweep.
    pub fn tick(&self) -> bool {
        let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        n % self.every == 0
    }

    /// Calls counted so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Count a call and sweep both stores if it is due.
    pub fn maybe_sweep(
        &self,
        sessions: &SessionStore,
        options: &OptionsStore,
        now: DateTime<Utc>,
        max_idle: Duration,
    ) -> Option<SweepReport> {
        self.tick()
            .then(|| Self::sweep(sessions, options, now, max_idle))
    }

    /// Unconditionally sweep both stores.
    pub fn sweep(
        sessions: &SessionStore,
        options: &OptionsStore,
        now: DateTime<Utc>,
        max_idle: Duration,
    ) -> SweepReport {
        let (slots_evicted, sessions_removed) = sessions.evict_idle(now, max_idle);
        let options_evicted = options.evict_idle(now, max_idle);
        let report = SweepReport {
            slots_evicted,
            sessions_removed,
            options_evicted,
        };

        metrics::counter!(telemetry::SWEEPS_TOTAL).increment(1);
        metrics::counter!(telemetry::EVICTIONS_TOTAL, "store" => "session_slot")
            .increment(slots_evicted as u64);
        metrics::counter!(telemetry::EVICTIONS_TOTAL, "store" => "session")
            .increment(sessions_removed as u64);
        metrics::counter!(telemetry::EVICTIONS_TOTAL, "store" => "options")
            .increment(options_evicted as u64);
        debug!(
            slots_evicted,
            sessions_removed,
            options_evicted,
            sessions_left = sessions.len(),
            options_left = options.len(),
            "cache sweep complete"
        );

        report
    }
}

impl Default for Sweeper {
    fn default() -> Self {
        Self::new(super::freshness::DEFAULT_SWEEP_EVERY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_fires_on_multiples() {
        let sweeper = Sweeper::new(3);
        let fired: Vec<bool> = (0..7).map(|_| sweeper.tick()).collect();
        assert_eq!(fired, [false, false, true, false, false, true, false]);
        assert_eq!(sweeper.calls(), 7);
    }

    #[test]
    fn zero_cadence_sweeps_every_call() {
        let sweeper = Sweeper::new(0);
        assert!(sweeper.tick());
        assert!(sweeper.tick());
    }
}
