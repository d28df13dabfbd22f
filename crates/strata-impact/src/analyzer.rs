//! The three-way comparison.
//!
//! Let T be the tenant body, diffP the platform-side diff between the
//! manifest's two versions, and diffT the customization's stored diff from
//! its base. A path conflicts when both diffs touch it (equality or
//! ancestor/descendant containment) with differing final values. Disjoint
//! platform ops merge onto T automatically; anything else is an operator
//! decision.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use strata_custom::{Customization, CustomizationStore};
use strata_diff::{apply, diff, paths_overlap, value_at, PatchKind, PatchOp};
use strata_history::{ChangeKind, ChangeLog, EntityType, HistoryDraft};
use strata_platform::{ManifestChange, PlatformSnapshot, PlatformStore, UpgradeManifest};
use strata_types::{
    Actor, ChangeType, ConflictType, CustomizationKind, ImpactId, ImpactStatus, ImpactType,
    ManifestId, ResourceRef, Severity, SuggestedResolution, TenantId,
};
use tracing::{debug, error};

use crate::error::{ImpactError, ImpactResult};
use crate::record::{ConflictDetail, ImpactRecord};
use crate::store::ImpactStore;

/// The outcome of analyzing one manifest for one tenant.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisReport {
    pub manifest_id: ManifestId,
    pub tenant_id: TenantId,
    pub impacts: Vec<ImpactRecord>,
    /// Record count per severity.
    pub summary: BTreeMap<Severity, usize>,
}

/// Run three-way impact analysis for one tenant over one manifest.
///
/// Idempotent: records are keyed by (tenant, manifest, resource), so
/// re-running updates existing records instead of creating duplicates.
/// Records already in a terminal status are returned untouched unless
/// `force` is set, which re-opens them to `Analyzed` with freshly computed
/// fields.
pub fn analyze_manifest(
    platform: &dyn PlatformStore,
    customizations: &dyn CustomizationStore,
    impacts: &dyn ImpactStore,
    history: &dyn ChangeLog,
    tenant: &TenantId,
    manifest: &UpgradeManifest,
    force: bool,
    actor: &Actor,
) -> ImpactResult<AnalysisReport> {
    let mut records = Vec::new();

    for change in &manifest.config_changes {
        let existing = impacts.get_by_scope(tenant, &manifest.id, &change.resource)?;
        if let Some(settled) = &existing {
            if settled.status.is_terminal() && !force {
                records.push(settled.clone());
                continue;
            }
        }

        let Some(mut record) = classify(platform, customizations, tenant, manifest, change)?
        else {
            continue;
        };

        if let Some(prior) = &existing {
            record.id = prior.id;
        }
        record.status = ImpactStatus::Analyzed;
        let saved = impacts.put(record)?;
        debug!(
            tenant = %tenant,
            resource = %saved.resource,
            impact = %saved.impact_type,
            severity = %saved.severity,
            "analyzed manifest entry"
        );

        let change_kind = if existing.is_some() {
            ChangeKind::Update
        } else {
            ChangeKind::Create
        };
        let mut draft = HistoryDraft::new(
            EntityType::ImpactRecord,
            saved.id.to_string(),
            change_kind,
            actor.clone(),
        )
        .with_after(to_state(&saved)?);
        if let Some(prior) = existing {
            draft = draft.with_before(to_state(&prior)?);
        }
        history.append(draft)?;

        records.push(saved);
    }

    let mut summary = BTreeMap::new();
    for record in &records {
        *summary.entry(record.severity).or_insert(0usize) += 1;
    }

    Ok(AnalysisReport {
        manifest_id: manifest.id,
        tenant_id: tenant.clone(),
        impacts: records,
        summary,
    })
}

fn to_state<T: Serialize>(value: &T) -> ImpactResult<Value> {
    serde_json::to_value(value).map_err(|e| ImpactError::Serialization(e.to_string()))
}

/// Classify one manifest entry against the tenant's customization.
///
/// Returns `Ok(None)` when nothing actionable exists: no customization and
/// the change is not an addition, or a tenant-only resource the platform
/// change does not collide with.
fn classify(
    platform: &dyn PlatformStore,
    customizations: &dyn CustomizationStore,
    tenant: &TenantId,
    manifest: &UpgradeManifest,
    change: &ManifestChange,
) -> ImpactResult<Option<ImpactRecord>> {
    let old_snapshot = platform.get(&change.resource, &manifest.from_version)?;
    let new_snapshot = platform.get(&change.resource, &manifest.to_version)?;

    let Some(customization) = customizations.active_for(tenant, &change.resource)? else {
        // Without a customization the new platform value simply applies at
        // the next publish; only additions are worth surfacing.
        if change.change_type == ChangeType::Added {
            let mut record = base_record(tenant, manifest.id, &change.resource, None);
            record.impact_type = ImpactType::NewAvailable;
            record.severity = change.impact_level;
            record.new_platform_value = new_snapshot.map(|s| s.body);
            record.platform_diff = change.diff.clone();
            record.suggested_resolution = SuggestedResolution::ManualReview;
            return Ok(Some(record));
        }
        return Ok(None);
    };

    if customization.kind == CustomizationKind::New {
        // A tenant-only resource only collides when the platform introduces
        // the same key.
        if change.change_type == ChangeType::Added {
            let new_body = new_snapshot.map(|s| s.body);
            let mut record =
                base_record(tenant, manifest.id, &change.resource, Some(&customization));
            record.impact_type = ImpactType::Conflict;
            record.severity = change.impact_level.max(Severity::High);
            record.new_platform_value = new_body.clone();
            record.suggested_resolution = SuggestedResolution::ManualReview;
            record.conflicts = vec![ConflictDetail {
                path: String::new(),
                conflict_type: ConflictType::PropertyAdded,
                tenant_value: Some(customization.body.clone()),
                platform_old_value: None,
                platform_new_value: new_body,
            }];
            return Ok(Some(record));
        }
        return Ok(None);
    }

    // Override / Extend: the three-way case.
    let mut record = base_record(tenant, manifest.id, &change.resource, Some(&customization));
    record.current_platform_value = old_snapshot.as_ref().map(|s| s.body.clone());
    record.new_platform_value = new_snapshot.as_ref().map(|s| s.body.clone());
    record.platform_diff = platform_diff(change, old_snapshot.as_ref(), new_snapshot.as_ref());

    if !base_is_intact(platform, &customization)? {
        // Corruption, not a merge problem: surface it and stop here.
        error!(
            tenant = %tenant,
            resource = %change.resource,
            customization = %customization.id,
            "stored base checksum matches no known platform snapshot"
        );
        record.impact_type = ImpactType::Conflict;
        record.severity = change.impact_level.max(Severity::High);
        record.suggested_resolution = SuggestedResolution::ManualReview;
        record.conflicts = vec![ConflictDetail {
            path: String::new(),
            conflict_type: ConflictType::ChecksumMismatch,
            tenant_value: Some(customization.body.clone()),
            platform_old_value: None,
            platform_new_value: record.new_platform_value.clone(),
        }];
        return Ok(Some(record));
    }

    match change.change_type {
        ChangeType::Deprecated => {
            record.impact_type = ImpactType::Deprecated;
            record.severity = change.impact_level.max(Severity::High);
            record.suggested_resolution = SuggestedResolution::ManualReview;
            Ok(Some(record))
        }
        ChangeType::Removed => {
            record.impact_type = ImpactType::Removed;
            record.severity = change.impact_level.max(Severity::Critical);
            record.suggested_resolution = SuggestedResolution::ManualReview;
            Ok(Some(record))
        }
        ChangeType::Added | ChangeType::Modified => {
            let tenant_diff = match &customization.diff_from_base {
                Some(ops) => ops.clone(),
                None => old_snapshot
                    .as_ref()
                    .map(|s| diff(&s.body, &customization.body))
                    .unwrap_or_default(),
            };
            let conflicts = find_conflicts(
                &tenant_diff,
                &record.platform_diff,
                &customization.body,
                old_snapshot.as_ref().map(|s| &s.body),
                new_snapshot.as_ref().map(|s| &s.body),
            );

            if conflicts.is_empty() {
                record.impact_type = match customization.kind {
                    CustomizationKind::Extend => ImpactType::ExtensionAffected,
                    _ => ImpactType::OverrideAffected,
                };
                record.severity = change.impact_level;
                record.suggested_resolution = SuggestedResolution::AutoMerge;
                let mergeable = disjoint_ops(&record.platform_diff, &tenant_diff);
                record.preview_merged_value = Some(apply(&customization.body, &mergeable)?);
            } else {
                record.impact_type = ImpactType::Conflict;
                record.severity = change.impact_level.max(Severity::Medium);
                record.suggested_resolution = SuggestedResolution::ManualReview;
                record.conflicts = conflicts;
            }
            Ok(Some(record))
        }
    }
}

/// The stored base checksum must match the platform snapshot the
/// customization claims to have diverged from.
fn base_is_intact(
    platform: &dyn PlatformStore,
    customization: &Customization,
) -> ImpactResult<bool> {
    match (
        &customization.base_platform_version,
        &customization.base_checksum,
    ) {
        (Some(version), Some(checksum)) => {
            let snapshot = platform.get(&customization.resource, version)?;
            Ok(snapshot.map_or(false, |s| s.checksum == *checksum))
        }
        _ => Ok(false),
    }
}

fn platform_diff(
    change: &ManifestChange,
    old: Option<&PlatformSnapshot>,
    new: Option<&PlatformSnapshot>,
) -> Vec<PatchOp> {
    if !change.diff.is_empty() {
        return change.diff.clone();
    }
    match (old, new) {
        (Some(old), Some(new)) => diff(&old.body, &new.body),
        _ => Vec::new(),
    }
}

/// Platform ops whose paths do not overlap any tenant-touched path.
///
/// Overlapping-but-compatible ops (both sides converging on the same
/// value) are also skipped: T already holds the outcome, and re-applying a
/// remove for an already-absent key would fail.
fn disjoint_ops(platform_ops: &[PatchOp], tenant_ops: &[PatchOp]) -> Vec<PatchOp> {
    platform_ops
        .iter()
        .filter(|p| !tenant_ops.iter().any(|t| paths_overlap(&t.path, &p.path)))
        .cloned()
        .collect()
}

/// Every path touched by both diffs with differing final outcomes yields
/// one [`ConflictDetail`], keyed by the shallower of the two overlapping
/// paths.
fn find_conflicts(
    tenant_ops: &[PatchOp],
    platform_ops: &[PatchOp],
    tenant_body: &Value,
    old_body: Option<&Value>,
    new_body: Option<&Value>,
) -> Vec<ConflictDetail> {
    let mut details: BTreeMap<String, ConflictDetail> = BTreeMap::new();

    for p_op in platform_ops {
        for t_op in tenant_ops {
            if !paths_overlap(&t_op.path, &p_op.path) {
                continue;
            }
            let region = if t_op.path.len() <= p_op.path.len() {
                t_op.path.clone()
            } else {
                p_op.path.clone()
            };
            if details.contains_key(&region) {
                continue;
            }

            let tenant_value = value_at(tenant_body, &region).cloned();
            let platform_new_value = new_body.and_then(|b| value_at(b, &region)).cloned();
            if tenant_value == platform_new_value {
                // Both sides converged on the same outcome.
                continue;
            }

            let conflict_type = classify_conflict(
                p_op,
                t_op,
                tenant_value.as_ref(),
                platform_new_value.as_ref(),
            );
            details.insert(
                region.clone(),
                ConflictDetail {
                    path: region.clone(),
                    conflict_type,
                    tenant_value,
                    platform_old_value: old_body.and_then(|b| value_at(b, &region)).cloned(),
                    platform_new_value,
                },
            );
        }
    }

    details.into_values().collect()
}

fn classify_conflict(
    p_op: &PatchOp,
    t_op: &PatchOp,
    tenant_value: Option<&Value>,
    platform_new_value: Option<&Value>,
) -> ConflictType {
    if tenant_value.is_some() && (p_op.op == PatchKind::Remove || platform_new_value.is_none()) {
        return ConflictType::PropertyRemoved;
    }
    if p_op.op == PatchKind::Add && t_op.op == PatchKind::Add {
        return ConflictType::PropertyAdded;
    }
    if let (Some(tenant), Some(platform)) = (tenant_value, platform_new_value) {
        if json_type(tenant) != json_type(platform) {
            return ConflictType::TypeMismatch;
        }
    }
    ConflictType::ValueChanged
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn base_record(
    tenant: &TenantId,
    manifest_id: ManifestId,
    resource: &ResourceRef,
    customization: Option<&Customization>,
) -> ImpactRecord {
    ImpactRecord {
        id: ImpactId::new(),
        tenant_id: tenant.clone(),
        manifest_id,
        customization_id: customization.map(|c| c.id),
        resource: resource.clone(),
        impact_type: ImpactType::NewAvailable,
        severity: Severity::None,
        current_tenant_value: customization.map(|c| c.body.clone()),
        current_platform_value: None,
        new_platform_value: None,
        platform_diff: Vec::new(),
        conflicts: Vec::new(),
        suggested_resolution: SuggestedResolution::ManualReview,
        preview_merged_value: None,
        status: ImpactStatus::PendingAnalysis,
        resolution_choice: None,
        custom_resolution_value: None,
        resolution_notes: None,
        resolved_by: None,
        resolved_at: None,
        auto_resolved: false,
    }
}
