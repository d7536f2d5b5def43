//! Per-session store for detective and audit cases.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::one::RefMut;

use super::{CacheEntry, elapsed};
use crate::types::{AuditCaseData, CaseData};

/// Session key used when the caller supplies none.
pub const ANONYMOUS_SESSION: &str = "anon";

/// Resolve an optional session id to a store key.
///
/// `None` and the empty string both map to [`ANONYMOUS_SESSION`].
pub fn session_key(session_id: Option<&str>) -> &str {
    match session_id {
        Some(id) if !id.is_empty() => id,
        _ => ANONYMOUS_SESSION,
    }
}

/// Everything cached for one session: one slot per game mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionBundle {
    /// Detective-mode case.
    pub detective: Option<CacheEntry<CaseData>>,
    /// Auditor-mode case.
    pub audit: Option<CacheEntry<AuditCaseData>>,
}

impl SessionBundle {
    /// True when both slots are empty.
    pub fn is_empty(&self) -> bool {
        self.detective.is_none() && self.audit.is_none()
    }

    /// Drop every slot not served within `max_idle`. Returns how many were dropped.
    pub(crate) fn evict_idle(&mut self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        usize::from(take_if_idle(&mut self.detective, now, max_idle))
            + usize::from(take_if_idle(&mut self.audit, now, max_idle))
    }
}

fn take_if_idle<T>(
    slot: &mut Option<CacheEntry<T>>,
    now: DateTime<Utc>,
    max_idle: Duration,
) -> bool {
    let idle = slot
        .as_ref()
        .is_some_and(|entry| elapsed(entry.last_served_at, now) > max_idle);
    if idle {
        *slot = None;
    }
    idle
}

/// An artifact type that lives in a [`SessionBundle`] slot.
///
/// Lets the orchestrator share one serve/store path between game modes.
pub trait SessionSlot: Clone + Send + Sync + 'static {
    /// Metric/log label for this artifact.
    const ARTIFACT: &'static str;

    /// The slot holding this artifact.
    fn slot_mut(bundle: &mut SessionBundle) -> &mut Option<CacheEntry<Self>>;
}

impl SessionSlot for CaseData {
    const ARTIFACT: &'static str = "case";

    fn slot_mut(bundle: &mut SessionBundle) -> &mut Option<CacheEntry<Self>> {
        &mut bundle.detective
    }
}

impl SessionSlot for AuditCaseData {
    const ARTIFACT: &'static str = "audit_case";

    fn slot_mut(bundle: &mut SessionBundle) -> &mut Option<CacheEntry<Self>> {
        &mut bundle.audit
    }
}

/// Thread-safe map from session key to [`SessionBundle`].
///
/// Bundles are created lazily by [`get_or_create`](Self::get_or_create) and
/// removed by the sweeper once both slots are gone.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, SessionBundle>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the bundle for `key`, registering an empty one on first access.
    ///
    /// The guard locks a shard of the map; drop it before awaiting.
    pub fn get_or_create(&self, key: &str) -> RefMut<'_, String, SessionBundle> {
        self.sessions.entry(key.to_string()).or_default()
    }

    /// Overwrite the `T` slot of `key`'s bundle.
    pub fn put<T: SessionSlot>(&self, key: &str, entry: CacheEntry<T>) {
        let mut bundle = self.get_or_create(key);
        *T::slot_mut(&mut bundle) = Some(entry);
    }

    /// Clone of the bundle for `key`, without creating one.
    pub fn snapshot(&self, key: &str) -> Option<SessionBundle> {
        self.sessions.get(key).map(|bundle| bundle.clone())
    }

    /// Whether a bundle exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.sessions.contains_key(key)
    }

    /// Remove the bundle for `key`, returning it.
    pub fn remove(&self, key: &str) -> Option<SessionBundle> {
        self.sessions.remove(key).map(|(_, bundle)| bundle)
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop every session.
    pub fn clear(&self) {
        self.sessions.clear();
    }

    /// Drop idle slots, then bundles left empty.
    ///
    /// Returns `(slots_dropped, sessions_dropped)`.
    pub(crate) fn evict_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> (usize, usize) {
        let mut slots = 0;
        let mut sessions = 0;
        self.sessions.retain(|_, bundle| {
            slots += bundle.evict_idle(now, max_idle);
            let keep = !bundle.is_empty();
            if !keep {
                sessions += 1;
            }
            keep
        });
        (slots, sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_defaults_to_anon() {
        assert_eq!(session_key(None), "anon");
        assert_eq!(session_key(Some("")), "anon");
        assert_eq!(session_key(Some("s1")), "s1");
    }

    #[test]
    fn take_if_idle_uses_strict_comparison() {
        let now = Utc::now();
        let max_idle = Duration::from_secs(60);
        let mut slot = Some(CacheEntry::new((), now - chrono::Duration::seconds(60)));
        assert!(!take_if_idle(&mut slot, now, max_idle));
        assert!(slot.is_some());

        let mut slot = Some(CacheEntry::new((), now - chrono::Duration::seconds(61)));
        assert!(take_if_idle(&mut slot, now, max_idle));
        assert!(slot.is_none());
    }
}
