use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_diff::PatchOp;
use strata_types::{
    Actor, ConflictType, CustomizationId, ImpactId, ImpactStatus, ImpactType, ManifestId,
    ResolutionChoice, ResourceRef, Severity, SuggestedResolution, TenantId,
};

/// One conflicting path in a three-way comparison.
///
/// Captures the tenant's value and both platform values at the overlapping
/// path so an operator can decide without re-running the analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConflictDetail {
    pub path: String,
    pub conflict_type: ConflictType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_old_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_new_value: Option<Value>,
}

/// The computed effect of one manifest entry on one tenant's customization.
///
/// Exactly one record exists per (tenant, manifest, resource); records are
/// updated on re-analysis and by resolution, never deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImpactRecord {
    pub id: ImpactId,
    pub tenant_id: TenantId,
    pub manifest_id: ManifestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customization_id: Option<CustomizationId>,
    #[serde(flatten)]
    pub resource: ResourceRef,
    pub impact_type: ImpactType,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_tenant_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_platform_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_platform_value: Option<Value>,
    pub platform_diff: Vec<PatchOp>,
    pub conflicts: Vec<ConflictDetail>,
    pub suggested_resolution: SuggestedResolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_merged_value: Option<Value>,
    pub status: ImpactStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_choice: Option<ResolutionChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_resolution_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<Actor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    pub auto_resolved: bool,
}

impl ImpactRecord {
    /// Returns `true` if this record blocks `apply_upgrade` until settled.
    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking() && !self.status.is_terminal()
    }

    /// Returns `true` if the record qualifies for automatic resolution:
    /// an auto-merge suggestion with zero conflicts and a computed preview.
    pub fn is_auto_mergeable(&self) -> bool {
        self.suggested_resolution == SuggestedResolution::AutoMerge
            && self.conflicts.is_empty()
            && self.preview_merged_value.is_some()
    }
}
