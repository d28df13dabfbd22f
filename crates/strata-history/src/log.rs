use std::sync::RwLock;

use chrono::Utc;
use strata_types::HistoryId;
use tracing::debug;

use crate::entry::{ChangeHistoryEntry, EntityType, HistoryDraft, HistoryFilter};
use crate::error::HistoryResult;

/// Append-only storage for change history entries.
///
/// Implementations never update or delete entries. Appends are totally
/// ordered per log; ids are time-ordered, so id order is append order.
pub trait ChangeLog: Send + Sync {
    /// Append an entry, assigning its id and timestamp.
    fn append(&self, draft: HistoryDraft) -> HistoryResult<ChangeHistoryEntry>;

    /// Read an entry by id. Returns `Ok(None)` if it does not exist.
    fn get(&self, id: &HistoryId) -> HistoryResult<Option<ChangeHistoryEntry>>;

    /// List entries matching a filter, oldest first (most recent first
    /// when a limit is set).
    fn list(&self, filter: &HistoryFilter) -> HistoryResult<Vec<ChangeHistoryEntry>>;

    /// The most recent entry for one entity, if any.
    fn latest_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> HistoryResult<Option<ChangeHistoryEntry>> {
        let filter = HistoryFilter::for_entity(entity_type, entity_id);
        Ok(self.list(&filter)?.into_iter().last())
    }
}

/// In-memory append-only change log.
///
/// Entries live in a `Vec` behind a `RwLock`, in append order.
pub struct InMemoryChangeLog {
    entries: RwLock<Vec<ChangeHistoryEntry>>,
}

impl InMemoryChangeLog {
    /// Create a new empty change log.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Number of entries in the log.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryChangeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeLog for InMemoryChangeLog {
    fn append(&self, draft: HistoryDraft) -> HistoryResult<ChangeHistoryEntry> {
        let entry = ChangeHistoryEntry {
            id: HistoryId::new(),
            entity_type: draft.entity_type,
            entity_id: draft.entity_id,
            change_kind: draft.change_kind,
            before_state: draft.before_state,
            after_state: draft.after_state,
            performed_by: draft.performed_by,
            created_at: Utc::now(),
            rollback_of: draft.rollback_of,
            reason: draft.reason,
        };
        debug!(
            id = %entry.id,
            entity = %entry.entity_id,
            kind = ?entry.change_kind,
            "appended history entry"
        );
        self.entries.write().expect("lock poisoned").push(entry.clone());
        Ok(entry)
    }

    fn get(&self, id: &HistoryId) -> HistoryResult<Option<ChangeHistoryEntry>> {
        let entries = self.entries.read().expect("lock poisoned");
        Ok(entries.iter().find(|e| &e.id == id).cloned())
    }

    fn list(&self, filter: &HistoryFilter) -> HistoryResult<Vec<ChangeHistoryEntry>> {
        let entries = self.entries.read().expect("lock poisoned");
        let mut matched: Vec<ChangeHistoryEntry> = entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        if let Some(limit) = filter.limit {
            matched.reverse();
            matched.truncate(limit);
        }
        Ok(matched)
    }
}

impl std::fmt::Debug for InMemoryChangeLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryChangeLog")
            .field("entry_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ChangeKind;
    use serde_json::json;
    use strata_types::Actor;

    fn draft(entity_id: &str, kind: ChangeKind) -> HistoryDraft {
        HistoryDraft::new(EntityType::Customization, entity_id, kind, Actor::new("op"))
            .with_after(json!({"v": 1}))
    }

    #[test]
    fn append_assigns_id_and_timestamp() {
        let log = InMemoryChangeLog::new();
        let entry = log.append(draft("c-1", ChangeKind::Create)).unwrap();
        assert_eq!(entry.entity_id, "c-1");

        let read = log.get(&entry.id).unwrap().expect("should exist");
        assert_eq!(read, entry);
    }

    #[test]
    fn get_missing_returns_none() {
        let log = InMemoryChangeLog::new();
        assert!(log.get(&HistoryId::new()).unwrap().is_none());
    }

    #[test]
    fn list_preserves_append_order() {
        let log = InMemoryChangeLog::new();
        let a = log.append(draft("c-1", ChangeKind::Create)).unwrap();
        let b = log.append(draft("c-1", ChangeKind::Update)).unwrap();
        let c = log.append(draft("c-2", ChangeKind::Create)).unwrap();

        let all = log.list(&HistoryFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, a.id);
        assert_eq!(all[1].id, b.id);
        assert_eq!(all[2].id, c.id);
    }

    #[test]
    fn entity_filter_limits_results() {
        let log = InMemoryChangeLog::new();
        log.append(draft("c-1", ChangeKind::Create)).unwrap();
        log.append(draft("c-2", ChangeKind::Create)).unwrap();

        let filtered = log
            .list(&HistoryFilter::for_entity(EntityType::Customization, "c-2"))
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].entity_id, "c-2");
    }

    #[test]
    fn limit_returns_most_recent_first() {
        let log = InMemoryChangeLog::new();
        log.append(draft("c-1", ChangeKind::Create)).unwrap();
        let latest = log.append(draft("c-1", ChangeKind::Update)).unwrap();

        let limited = log
            .list(&HistoryFilter {
                limit: Some(1),
                ..HistoryFilter::default()
            })
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, latest.id);
    }

    #[test]
    fn latest_for_entity() {
        let log = InMemoryChangeLog::new();
        log.append(draft("c-1", ChangeKind::Create)).unwrap();
        let latest = log.append(draft("c-1", ChangeKind::Update)).unwrap();
        log.append(draft("c-2", ChangeKind::Create)).unwrap();

        let found = log
            .latest_for_entity(EntityType::Customization, "c-1")
            .unwrap()
            .expect("should exist");
        assert_eq!(found.id, latest.id);
    }

    #[test]
    fn rollback_links_are_preserved() {
        let log = InMemoryChangeLog::new();
        let original = log.append(draft("c-1", ChangeKind::Update)).unwrap();
        let rollback = log
            .append(
                HistoryDraft::new(
                    EntityType::Customization,
                    "c-1",
                    ChangeKind::Rollback,
                    Actor::new("op"),
                )
                .with_rollback_of(original.id),
            )
            .unwrap();
        assert_eq!(rollback.rollback_of, Some(original.id));
    }
}
