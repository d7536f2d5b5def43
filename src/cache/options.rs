//! Store for generated rectification option sets.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::one::{Ref, RefMut};

use super::{CacheEntry, elapsed};
use crate::types::{CaseData, RectificationOption};

/// Cached option list, sorted `A`–`D`.
pub type OptionSet = Vec<RectificationOption>;

/// Composite key for an option set.
///
/// Embeds the case's identity and content (`id`, botched element, faulty
/// prompt) so regenerating the case, even under the same id, yields a new key.
pub fn options_key(session: &str, case: &CaseData) -> String {
    format!(
        "{session}:{}:{}:{}",
        case.id, case.botched_element, case.faulty_prompt
    )
}

/// Thread-safe map from [`options_key`] to a cached option set.
///
/// No implicit creation: callers build the key and `set` explicitly.
#[derive(Debug, Default)]
pub struct OptionsStore {
    entries: DashMap<String, CacheEntry<OptionSet>>,
}

impl OptionsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry.
    pub fn get(&self, key: &str) -> Option<Ref<'_, String, CacheEntry<OptionSet>>> {
        self.entries.get(key)
    }

    /// Look up an entry for in-place update (e.g. touching `last_served_at`).
    ///
    /// The guard locks a shard of the map; drop it before awaiting.
    pub fn get_mut(&self, key: &str) -> Option<RefMut<'_, String, CacheEntry<OptionSet>>> {
        self.entries.get_mut(key)
    }

    /// Insert or overwrite an entry.
    pub fn set(&self, key: impl Into<String>, entry: CacheEntry<OptionSet>) {
        self.entries.insert(key.into(), entry);
    }

    /// Whether an entry exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove an entry, returning it.
    pub fn remove(&self, key: &str) -> Option<CacheEntry<OptionSet>> {
        self.entries.remove(key).map(|(_, entry)| entry)
    }

    /// Number of cached option sets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Remove entries not served within `max_idle`. Returns how many were removed.
    pub(crate) fn evict_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = elapsed(entry.last_served_at, now) <= max_idle;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CoStarElement;

    fn case(faulty_prompt: &str) -> CaseData {
        CaseData {
            id: "123".into(),
            title: "t".into(),
            backstory: "b".into(),
            faulty_prompt: faulty_prompt.into(),
            faulty_output: "o".into(),
            botched_element: CoStarElement::Tone,
            botched_explanation: "e".into(),
            ideal_prompt: "i".into(),
        }
    }

    #[test]
    fn key_layout() {
        assert_eq!(
            options_key("s1", &case("Write a note")),
            "s1:123:tone:Write a note"
        );
    }

    #[test]
    fn key_changes_with_case_content() {
        assert_ne!(
            options_key("s1", &case("Write a note")),
            options_key("s1", &case("Write a letter"))
        );
    }
}
