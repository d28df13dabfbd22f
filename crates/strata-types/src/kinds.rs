//! Classification enums shared across the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a tenant's customization relates to the platform resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomizationKind {
    /// Full replacement of the platform body.
    Override,
    /// Additive extension of an extensible platform resource.
    Extend,
    /// A tenant-only resource with no platform counterpart.
    New,
}

/// How a resource changed between two platform versions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,
    Modified,
    Removed,
    Deprecated,
}

/// The computed effect of one manifest entry on one tenant's customization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactType {
    /// Tenant and platform both changed an overlapping path with
    /// incompatible outcomes.
    Conflict,
    /// An override exists but platform changes are disjoint from it.
    OverrideAffected,
    /// An extension exists but platform changes are disjoint from it.
    ExtensionAffected,
    /// The platform deprecated a resource the tenant customizes.
    Deprecated,
    /// The platform removed a resource the tenant customizes.
    Removed,
    /// The platform added a resource the tenant has not customized.
    NewAvailable,
}

/// Lifecycle of an impact record.
///
/// `PendingAnalysis → Analyzed → {Resolved | AutoResolved} → Acknowledged`;
/// `Analyzed → Acknowledged` directly for non-actionable records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactStatus {
    PendingAnalysis,
    Analyzed,
    Resolved,
    Acknowledged,
    AutoResolved,
}

impl ImpactStatus {
    /// Terminal statuses admit no further resolution without a rollback.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::AutoResolved | Self::Acknowledged)
    }
}

/// Why two values at one path cannot be merged automatically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// Both sides changed the value to different results.
    ValueChanged,
    /// The platform removed a property the tenant still depends on.
    PropertyRemoved,
    /// Both sides added the same property with different values.
    PropertyAdded,
    /// The value's JSON type differs between the two sides.
    TypeMismatch,
    /// The customization's stored base checksum matches no known platform
    /// snapshot; the record is corrupt and needs manual review.
    ChecksumMismatch,
}

/// Strategy chosen (or suggested) to settle an impact record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionChoice {
    /// Adopt the new platform body, discarding the customization.
    UsePlatform,
    /// Keep the tenant body unchanged.
    KeepTenant,
    /// Apply the non-overlapping platform changes onto the tenant body.
    AutoMerge,
    /// Use a caller-supplied merged body (schema-validated externally).
    CustomMerge,
}

/// The analyzer's recommendation for a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedResolution {
    /// Changes are disjoint; the merge can be applied automatically.
    AutoMerge,
    /// An operator must pick a side or supply a merged value.
    ManualReview,
}

impl fmt::Display for ImpactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Conflict => "conflict",
            Self::OverrideAffected => "override_affected",
            Self::ExtensionAffected => "extension_affected",
            Self::Deprecated => "deprecated",
            Self::Removed => "removed",
            Self::NewAvailable => "new_available",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for ImpactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PendingAnalysis => "pending_analysis",
            Self::Analyzed => "analyzed",
            Self::Resolved => "resolved",
            Self::Acknowledged => "acknowledged",
            Self::AutoResolved => "auto_resolved",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for ResolutionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UsePlatform => "use_platform",
            Self::KeepTenant => "keep_tenant",
            Self::AutoMerge => "auto_merge",
            Self::CustomMerge => "custom_merge",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!ImpactStatus::PendingAnalysis.is_terminal());
        assert!(!ImpactStatus::Analyzed.is_terminal());
        assert!(ImpactStatus::Resolved.is_terminal());
        assert!(ImpactStatus::AutoResolved.is_terminal());
        assert!(ImpactStatus::Acknowledged.is_terminal());
    }

    #[test]
    fn wire_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&ImpactType::OverrideAffected).unwrap(),
            "\"override_affected\""
        );
        assert_eq!(
            serde_json::to_string(&ResolutionChoice::CustomMerge).unwrap(),
            "\"custom_merge\""
        );
        assert_eq!(
            serde_json::to_string(&ConflictType::ChecksumMismatch).unwrap(),
            "\"checksum_mismatch\""
        );
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(ImpactType::NewAvailable.to_string(), "new_available");
        assert_eq!(ImpactStatus::AutoResolved.to_string(), "auto_resolved");
        assert_eq!(ResolutionChoice::KeepTenant.to_string(), "keep_tenant");
    }

    #[test]
    fn serde_roundtrip() {
        for kind in [
            CustomizationKind::Override,
            CustomizationKind::Extend,
            CustomizationKind::New,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            let parsed: CustomizationKind = serde_json::from_str(&json).unwrap();
            assert_eq!(kind, parsed);
        }
    }
}
