//! Turning decisions into customization versions.
//!
//! Every settlement path runs through the same pipeline: check the record
//! is open, check the choice is legal, compute the candidate value, write
//! it through the customization store, then move the record forward and
//! log history. `preview_merge` runs the first three steps and stops.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use strata_custom::{Customization, CustomizationStore, Governance, NewCustomization};
use strata_diff::{apply, paths_overlap, PatchOp};
use strata_history::{ChangeKind, ChangeLog, EntityType, HistoryDraft};
use strata_impact::{ImpactRecord, ImpactStore};
use strata_platform::{ManifestStore, PlatformStore};
use strata_types::{
    Actor, CustomizationKind, ImpactId, ImpactStatus, ResolutionChoice,
};
use tracing::{debug, info};

use crate::error::{ResolveError, ResolveResult};
use crate::legality;

/// An operator's decision for one impact record.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub choice: ResolutionChoice,
    /// Required for [`ResolutionChoice::CustomMerge`], ignored otherwise.
    pub custom_value: Option<Value>,
    pub notes: Option<String>,
}

impl Resolution {
    pub fn new(choice: ResolutionChoice) -> Self {
        Self {
            choice,
            custom_value: None,
            notes: None,
        }
    }

    pub fn custom(value: Value) -> Self {
        Self {
            choice: ResolutionChoice::CustomMerge,
            custom_value: Some(value),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Drives the impact-record state machine.
///
/// Borrows its collaborators so the same store instances can back the
/// analyzer, the resolver, and the engine facade at once.
pub struct Resolver<'a> {
    platform: &'a dyn PlatformStore,
    manifests: &'a dyn ManifestStore,
    customizations: &'a dyn CustomizationStore,
    governance: &'a dyn Governance,
    impacts: &'a dyn ImpactStore,
    history: &'a dyn ChangeLog,
}

impl<'a> Resolver<'a> {
    pub fn new(
        platform: &'a dyn PlatformStore,
        manifests: &'a dyn ManifestStore,
        customizations: &'a dyn CustomizationStore,
        governance: &'a dyn Governance,
        impacts: &'a dyn ImpactStore,
        history: &'a dyn ChangeLog,
    ) -> Self {
        Self {
            platform,
            manifests,
            customizations,
            governance,
            impacts,
            history,
        }
    }

    /// The candidate merged value a strategy would produce, without
    /// writing anything.
    ///
    /// `Ok(None)` means the strategy leaves the tenant with no value at
    /// all, which happens when accepting the removal of a resource.
    pub fn preview_merge(
        &self,
        id: &ImpactId,
        choice: ResolutionChoice,
        custom_value: Option<Value>,
    ) -> ResolveResult<Option<Value>> {
        let record = self.load(id)?;
        self.candidate_value(&record, choice, custom_value)
    }

    /// Settle a zero-conflict record by materializing its computed merge
    /// preview. Idempotent: re-running on an auto-resolved record returns
    /// it unchanged.
    pub fn auto_resolve(&self, id: &ImpactId, actor: &Actor) -> ResolveResult<ImpactRecord> {
        let record = self.load(id)?;
        if record.status == ImpactStatus::AutoResolved {
            return Ok(record);
        }
        if record.status.is_terminal() {
            return Err(ResolveError::AlreadyTerminal {
                id: *id,
                status: record.status,
            });
        }
        if record.status != ImpactStatus::Analyzed {
            return Err(ResolveError::IllegalTransition {
                id: *id,
                status: record.status,
            });
        }
        if !record.is_auto_mergeable() {
            return Err(ResolveError::NotAutoMergeable { id: *id });
        }

        let merged = record
            .preview_merged_value
            .clone()
            .ok_or(ResolveError::NotAutoMergeable { id: *id })?;
        let written = self.materialize(&record, ResolutionChoice::AutoMerge, Some(merged), actor)?;

        let mut resolved = record.clone();
        resolved.status = ImpactStatus::AutoResolved;
        resolved.auto_resolved = true;
        resolved.resolution_choice = Some(ResolutionChoice::AutoMerge);
        resolved.resolved_by = Some(actor.clone());
        resolved.resolved_at = Some(Utc::now());
        if let Some(customization) = &written {
            resolved.customization_id = Some(customization.id);
        }
        let saved = self.impacts.put(resolved)?;
        self.log_transition(&record, &saved, actor)?;
        info!(
            id = %saved.id,
            resource = %saved.resource,
            "auto-resolved impact record"
        );
        Ok(saved)
    }

    /// Settle a record with an operator decision.
    ///
    /// Fails on terminal records; settling again requires a rollback
    /// first.
    pub fn resolve_impact(
        &self,
        id: &ImpactId,
        resolution: Resolution,
        actor: &Actor,
    ) -> ResolveResult<ImpactRecord> {
        let record = self.load(id)?;
        if record.status.is_terminal() {
            return Err(ResolveError::AlreadyTerminal {
                id: *id,
                status: record.status,
            });
        }
        if record.status != ImpactStatus::Analyzed {
            return Err(ResolveError::IllegalTransition {
                id: *id,
                status: record.status,
            });
        }

        let value =
            self.candidate_value(&record, resolution.choice, resolution.custom_value.clone())?;
        let written = self.materialize(&record, resolution.choice, value, actor)?;

        let mut resolved = record.clone();
        resolved.status = ImpactStatus::Resolved;
        resolved.auto_resolved = false;
        resolved.resolution_choice = Some(resolution.choice);
        if resolution.choice == ResolutionChoice::CustomMerge {
            resolved.custom_resolution_value = resolution.custom_value;
        }
        resolved.resolution_notes = resolution.notes;
        resolved.resolved_by = Some(actor.clone());
        resolved.resolved_at = Some(Utc::now());
        if let Some(customization) = &written {
            resolved.customization_id = Some(customization.id);
        }
        let saved = self.impacts.put(resolved)?;
        self.log_transition(&record, &saved, actor)?;
        info!(
            id = %saved.id,
            resource = %saved.resource,
            choice = %resolution.choice,
            "resolved impact record"
        );
        Ok(saved)
    }

    /// Mark a record terminal without materializing anything.
    ///
    /// Legal from `Analyzed` (non-actionable records) and from the two
    /// resolved statuses. Idempotent on already-acknowledged records.
    pub fn acknowledge(&self, id: &ImpactId, actor: &Actor) -> ResolveResult<ImpactRecord> {
        let record = self.load(id)?;
        match record.status {
            ImpactStatus::Acknowledged => Ok(record),
            ImpactStatus::Analyzed | ImpactStatus::Resolved | ImpactStatus::AutoResolved => {
                let mut acknowledged = record.clone();
                acknowledged.status = ImpactStatus::Acknowledged;
                let saved = self.impacts.put(acknowledged)?;
                self.log_transition(&record, &saved, actor)?;
                Ok(saved)
            }
            ImpactStatus::PendingAnalysis => Err(ResolveError::IllegalTransition {
                id: *id,
                status: record.status,
            }),
        }
    }

    fn load(&self, id: &ImpactId) -> ResolveResult<ImpactRecord> {
        self.impacts
            .get(id)?
            .ok_or(ResolveError::ImpactNotFound { id: *id })
    }

    /// The value a strategy produces for a record, after legality and
    /// validation checks. Pure with respect to the stores.
    fn candidate_value(
        &self,
        record: &ImpactRecord,
        choice: ResolutionChoice,
        custom_value: Option<Value>,
    ) -> ResolveResult<Option<Value>> {
        if !legality::is_allowed(record.impact_type, choice) {
            return Err(ResolveError::IllegalChoice {
                choice,
                impact_type: record.impact_type,
            });
        }
        match choice {
            ResolutionChoice::UsePlatform => Ok(record.new_platform_value.clone()),
            ResolutionChoice::KeepTenant => Ok(record.current_tenant_value.clone()),
            ResolutionChoice::AutoMerge => Ok(Some(self.auto_merge_value(record)?)),
            ResolutionChoice::CustomMerge => {
                let value = custom_value.ok_or(ResolveError::MissingCustomValue)?;
                self.governance
                    .validate_body(&record.resource, &value)
                    .map_err(|reason| ResolveError::SchemaRejected { reason })?;
                Ok(Some(value))
            }
        }
    }

    /// Recompute the auto merge: platform ops disjoint from every
    /// tenant-touched path, applied onto the tenant's current body.
    fn auto_merge_value(&self, record: &ImpactRecord) -> ResolveResult<Value> {
        if !record.conflicts.is_empty() {
            return Err(ResolveError::NotAutoMergeable { id: record.id });
        }
        let customization = self.active_customization(record)?;
        let tenant_ops = customization.diff_from_base.clone().unwrap_or_default();
        let mergeable: Vec<PatchOp> = record
            .platform_diff
            .iter()
            .filter(|p| !tenant_ops.iter().any(|t| paths_overlap(&t.path, &p.path)))
            .cloned()
            .collect();
        Ok(apply(&customization.body, &mergeable)?)
    }

    fn active_customization(&self, record: &ImpactRecord) -> ResolveResult<Customization> {
        let id = record
            .customization_id
            .ok_or(ResolveError::ImpactNotFound { id: record.id })?;
        self.customizations
            .active_for(&record.tenant_id, &record.resource)?
            .ok_or(ResolveError::CustomizationNotFound { id })
    }

    /// Write the chosen value through the customization store.
    ///
    /// Returns the new customization version, or `None` when the choice
    /// needs no tenant-side write (keeping a value that has no active row,
    /// or adopting a platform addition as-is).
    fn materialize(
        &self,
        record: &ImpactRecord,
        choice: ResolutionChoice,
        value: Option<Value>,
        actor: &Actor,
    ) -> ResolveResult<Option<Customization>> {
        let manifest = self
            .manifests
            .get(&record.manifest_id)?
            .ok_or(ResolveError::ManifestNotFound {
                id: record.manifest_id,
            })?;
        let active = self
            .customizations
            .active_for(&record.tenant_id, &record.resource)?;

        match (active, value) {
            // Adopting the platform's version of a tenant-only resource
            // means dropping the tenant's copy, not rewriting it.
            (Some(active), Some(_))
                if choice == ResolutionChoice::UsePlatform
                    && active.kind == CustomizationKind::New =>
            {
                self.deactivate_with_history(&active, actor)?;
                Ok(None)
            }
            (Some(active), Some(value)) => {
                let rebased_snapshot = if active.kind == CustomizationKind::New {
                    None
                } else {
                    self.platform.get(&record.resource, &manifest.to_version)?
                };
                let successor = match rebased_snapshot {
                    Some(_) => self.customizations.rebase(
                        self.platform,
                        self.governance,
                        &active.id,
                        value,
                        &manifest.to_version,
                        active.version,
                        actor,
                    )?,
                    None => self.customizations.update(
                        self.platform,
                        self.governance,
                        &active.id,
                        value,
                        active.version,
                        actor,
                    )?,
                };
                self.history.append(
                    HistoryDraft::new(
                        EntityType::Customization,
                        successor.id.to_string(),
                        ChangeKind::Update,
                        actor.clone(),
                    )
                    .with_before(to_state(&active)?)
                    .with_after(to_state(&successor)?),
                )?;
                Ok(Some(successor))
            }
            (Some(active), None) => {
                self.deactivate_with_history(&active, actor)?;
                Ok(None)
            }
            (None, Some(value)) if choice == ResolutionChoice::CustomMerge => {
                let created = self.customizations.create(
                    self.platform,
                    self.governance,
                    NewCustomization {
                        tenant_id: record.tenant_id.clone(),
                        resource: record.resource.clone(),
                        kind: CustomizationKind::Override,
                        base_platform_version: Some(manifest.to_version.clone()),
                        body: value,
                        created_by: actor.clone(),
                    },
                )?;
                self.history.append(
                    HistoryDraft::new(
                        EntityType::Customization,
                        created.id.to_string(),
                        ChangeKind::Create,
                        actor.clone(),
                    )
                    .with_after(to_state(&created)?),
                )?;
                Ok(Some(created))
            }
            (None, _) => Ok(None),
        }
    }

    fn deactivate_with_history(
        &self,
        active: &Customization,
        actor: &Actor,
    ) -> ResolveResult<()> {
        let deactivated = self
            .customizations
            .deactivate(&active.id, active.version, actor)?;
        self.history.append(
            HistoryDraft::new(
                EntityType::Customization,
                deactivated.id.to_string(),
                ChangeKind::Delete,
                actor.clone(),
            )
            .with_before(to_state(active)?),
        )?;
        debug!(
            id = %deactivated.id,
            resource = %deactivated.resource,
            "deactivated customization during resolution"
        );
        Ok(())
    }

    fn log_transition(
        &self,
        before: &ImpactRecord,
        after: &ImpactRecord,
        actor: &Actor,
    ) -> ResolveResult<()> {
        self.history.append(
            HistoryDraft::new(
                EntityType::ImpactRecord,
                after.id.to_string(),
                ChangeKind::Update,
                actor.clone(),
            )
            .with_before(to_state(before)?)
            .with_after(to_state(after)?),
        )?;
        Ok(())
    }
}

fn to_state<T: Serialize>(value: &T) -> ResolveResult<Value> {
    serde_json::to_value(value).map_err(|e| ResolveError::Serialization(e.to_string()))
}
