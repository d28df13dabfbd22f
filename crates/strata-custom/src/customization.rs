use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_diff::PatchOp;
use strata_types::{Actor, Checksum, CustomizationId, CustomizationKind, ResourceRef, TenantId};

/// One immutable version of a tenant's customization.
///
/// For kinds `Override` and `Extend`, `base_platform_version` and
/// `base_checksum` pin the platform snapshot the body diverged from and
/// `diff_from_base` is the stored tenant-side diff the analyzer feeds into
/// three-way comparison. For kind `New` there is no base.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customization {
    pub id: CustomizationId,
    pub tenant_id: TenantId,
    #[serde(flatten)]
    pub resource: ResourceRef,
    pub kind: CustomizationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_platform_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_checksum: Option<Checksum>,
    pub body: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_from_base: Option<Vec<PatchOp>>,
    pub is_active: bool,
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_version_id: Option<CustomizationId>,
    pub created_by: Actor,
    pub created_at: DateTime<Utc>,
}

/// Input for creating the first version of a customization.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCustomization {
    pub tenant_id: TenantId,
    pub resource: ResourceRef,
    pub kind: CustomizationKind,
    /// Required for `Override`/`Extend`; for `New` it names the platform
    /// version checked for key collisions, if any.
    pub base_platform_version: Option<String>,
    pub body: Value,
    pub created_by: Actor,
}

/// Filters for listing customizations. Empty filters match everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomizationFilter {
    pub tenant_id: Option<TenantId>,
    pub config_type: Option<String>,
    pub kind: Option<CustomizationKind>,
    /// When `true`, only active rows are returned.
    pub active_only: bool,
}

impl CustomizationFilter {
    pub(crate) fn matches(&self, customization: &Customization) -> bool {
        self.tenant_id
            .as_ref()
            .map_or(true, |t| t == &customization.tenant_id)
            && self
                .config_type
                .as_ref()
                .map_or(true, |c| c == &customization.resource.config_type)
            && self.kind.map_or(true, |k| k == customization.kind)
            && (!self.active_only || customization.is_active)
    }
}
