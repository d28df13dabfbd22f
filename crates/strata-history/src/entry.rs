use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_types::{Actor, HistoryId};

/// The entity family a history entry describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Customization,
    ImpactRecord,
    TenantVersion,
}

/// How the entity changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
    Rollback,
}

/// One append-only audit entry.
///
/// `before_state` is absent for creations, `after_state` is absent for
/// deletions. `rollback_of` links a rollback entry to the entry whose
/// before-state it reproduced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeHistoryEntry {
    pub id: HistoryId,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub change_kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_state: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_state: Option<Value>,
    pub performed_by: Actor,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback_of: Option<HistoryId>,
    /// Operator-supplied justification; set on rollback entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Input for appending an entry; the log assigns id and timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryDraft {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub change_kind: ChangeKind,
    pub before_state: Option<Value>,
    pub after_state: Option<Value>,
    pub performed_by: Actor,
    pub rollback_of: Option<HistoryId>,
    pub reason: Option<String>,
}

impl HistoryDraft {
    pub fn new(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        change_kind: ChangeKind,
        performed_by: Actor,
    ) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            change_kind,
            before_state: None,
            after_state: None,
            performed_by,
            rollback_of: None,
            reason: None,
        }
    }

    pub fn with_before(mut self, state: Value) -> Self {
        self.before_state = Some(state);
        self
    }

    pub fn with_after(mut self, state: Value) -> Self {
        self.after_state = Some(state);
        self
    }

    pub fn with_rollback_of(mut self, id: HistoryId) -> Self {
        self.rollback_of = Some(id);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Filters for listing history entries. Empty filters match everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub performed_by: Option<Actor>,
    pub change_kind: Option<ChangeKind>,
    /// Cap on returned entries (most recent first when set).
    pub limit: Option<usize>,
}

impl HistoryFilter {
    /// Filter for one specific entity.
    pub fn for_entity(entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: Some(entity_type),
            entity_id: Some(entity_id.into()),
            ..Self::default()
        }
    }

    pub(crate) fn matches(&self, entry: &ChangeHistoryEntry) -> bool {
        self.entity_type.map_or(true, |t| t == entry.entity_type)
            && self
                .entity_id
                .as_ref()
                .map_or(true, |id| id == &entry.entity_id)
            && self
                .performed_by
                .as_ref()
                .map_or(true, |a| a == &entry.performed_by)
            && self.change_kind.map_or(true, |k| k == entry.change_kind)
    }
}
