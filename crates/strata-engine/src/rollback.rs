//! Rollback over the change history.
//!
//! A rollback never reverts in place: it writes a new customization
//! version (or record state) reproducing the entry's before-state, and the
//! rollback itself becomes a new history entry linked via `rollback_of`.
//! The stale-rollback guard refuses to touch an entity that was mutated
//! after the entry being rolled back.

use strata_custom::{Customization, CustomizationStore, NewCustomization};
use strata_history::{ChangeHistoryEntry, ChangeKind, ChangeLog, EntityType, HistoryDraft};
use strata_impact::{ImpactRecord, ImpactStore};
use strata_types::{Actor, HistoryId};
use tracing::info;

use crate::engine::{to_state, MergeEngine};
use crate::error::{EngineError, EngineResult};

impl MergeEngine {
    /// Roll back the mutation recorded by one history entry.
    ///
    /// Customization entries produce a new version (or a fresh chain for a
    /// rolled-back deletion); impact-record entries restore the record's
    /// prior state, re-opening it for resolution. Tenant version markers
    /// move only through `apply_upgrade` and are not rollback targets.
    pub fn rollback(
        &self,
        history_id: &HistoryId,
        reason: &str,
        actor: &Actor,
    ) -> EngineResult<ChangeHistoryEntry> {
        let entry = self.get_history(history_id)?;
        let rolled = match entry.entity_type {
            EntityType::Customization => self.rollback_customization(&entry, reason, actor)?,
            EntityType::ImpactRecord => self.rollback_impact(&entry, reason, actor)?,
            EntityType::TenantVersion => {
                return Err(EngineError::State(
                    "tenant version markers move only through apply_upgrade".into(),
                ))
            }
        };
        info!(
            entry = %entry.id,
            entity = %entry.entity_id,
            by = %actor,
            "rolled back history entry"
        );
        Ok(rolled)
    }

    fn rollback_customization(
        &self,
        entry: &ChangeHistoryEntry,
        reason: &str,
        actor: &Actor,
    ) -> EngineResult<ChangeHistoryEntry> {
        let before = parse_state::<Customization>(entry.before_state.as_ref())?;
        let after = parse_state::<Customization>(entry.after_state.as_ref())?;

        match (before, after) {
            // Creation: rolling back means deactivating the created row.
            (None, Some(after)) => {
                self.guard_is_active_tip(&after)?;
                self.customizations
                    .deactivate(&after.id, after.version, actor)?;
                self.append_rollback(
                    entry,
                    EntityType::Customization,
                    after.id.to_string(),
                    Some(to_state(&after)?),
                    None,
                    reason,
                    actor,
                )
            }
            // Update: write a successor reproducing the before-state.
            (Some(before), Some(after)) => {
                self.guard_is_active_tip(&after)?;
                let restored = match &before.base_platform_version {
                    Some(base) if before.base_platform_version != after.base_platform_version => {
                        self.customizations.rebase(
                            &self.platform,
                            self.governance.as_ref(),
                            &after.id,
                            before.body.clone(),
                            base,
                            after.version,
                            actor,
                        )?
                    }
                    _ => self.customizations.update(
                        &self.platform,
                        self.governance.as_ref(),
                        &after.id,
                        before.body.clone(),
                        after.version,
                        actor,
                    )?,
                };
                self.append_rollback(
                    entry,
                    EntityType::Customization,
                    restored.id.to_string(),
                    Some(to_state(&after)?),
                    Some(to_state(&restored)?),
                    reason,
                    actor,
                )
            }
            // Deletion: re-create the customization from the before-state.
            (Some(before), None) => {
                if self
                    .customizations
                    .active_for(&before.tenant_id, &before.resource)?
                    .is_some()
                {
                    return Err(EngineError::State(format!(
                        "{} was customized again after the deletion being rolled back",
                        before.resource
                    )));
                }
                let recreated = self.customizations.create(
                    &self.platform,
                    self.governance.as_ref(),
                    NewCustomization {
                        tenant_id: before.tenant_id.clone(),
                        resource: before.resource.clone(),
                        kind: before.kind,
                        base_platform_version: before.base_platform_version.clone(),
                        body: before.body.clone(),
                        created_by: actor.clone(),
                    },
                )?;
                self.append_rollback(
                    entry,
                    EntityType::Customization,
                    recreated.id.to_string(),
                    None,
                    Some(to_state(&recreated)?),
                    reason,
                    actor,
                )
            }
            (None, None) => Err(EngineError::Internal(format!(
                "history entry {} carries no state to roll back",
                entry.id
            ))),
        }
    }

    /// The row written by the entry must still be the active tip; a later
    /// mutation makes the rollback stale.
    fn guard_is_active_tip(&self, after: &Customization) -> EngineResult<()> {
        let active = self
            .customizations
            .active_for(&after.tenant_id, &after.resource)?;
        match active {
            Some(active) if active.id == after.id => Ok(()),
            Some(active) => Err(EngineError::Conflict {
                expected: after.version,
                current: active.version,
            }),
            None => Err(EngineError::State(format!(
                "{} has no active customization; the entry being rolled back is stale",
                after.resource
            ))),
        }
    }

    fn rollback_impact(
        &self,
        entry: &ChangeHistoryEntry,
        reason: &str,
        actor: &Actor,
    ) -> EngineResult<ChangeHistoryEntry> {
        let Some(before) = parse_state::<ImpactRecord>(entry.before_state.as_ref())? else {
            return Err(EngineError::State(
                "impact records are never deleted; their creation cannot be rolled back".into(),
            ));
        };
        let after = parse_state::<ImpactRecord>(entry.after_state.as_ref())?.ok_or_else(|| {
            EngineError::Internal(format!("history entry {} has no after-state", entry.id))
        })?;

        let current = self.get_impact(&after.id)?;
        if current != after {
            return Err(EngineError::State(format!(
                "impact record {} was mutated after the entry being rolled back",
                after.id
            )));
        }

        let restored = self.impacts.put(before)?;
        self.append_rollback(
            entry,
            EntityType::ImpactRecord,
            restored.id.to_string(),
            Some(to_state(&after)?),
            Some(to_state(&restored)?),
            reason,
            actor,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn append_rollback(
        &self,
        rolled_back: &ChangeHistoryEntry,
        entity_type: EntityType,
        entity_id: String,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
        reason: &str,
        actor: &Actor,
    ) -> EngineResult<ChangeHistoryEntry> {
        let mut draft = HistoryDraft::new(entity_type, entity_id, ChangeKind::Rollback, actor.clone())
            .with_rollback_of(rolled_back.id)
            .with_reason(reason);
        if let Some(state) = before {
            draft = draft.with_before(state);
        }
        if let Some(state) = after {
            draft = draft.with_after(state);
        }
        Ok(self.history.append(draft)?)
    }
}

fn parse_state<T: serde::de::DeserializeOwned>(
    state: Option<&serde_json::Value>,
) -> EngineResult<Option<T>> {
    state
        .map(|v| serde_json::from_value(v.clone()))
        .transpose()
        .map_err(|e| EngineError::Internal(format!("stored state failed to parse: {e}")))
}
