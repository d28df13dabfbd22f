//! High-level facade for the Strata merge engine.
//!
//! [`MergeEngine`] owns one set of stores and exposes the whole engine
//! surface: customization lifecycle, platform publishing, three-way
//! impact analysis, resolution, upgrades, change history, and rollback.
//! Every mutation it performs is paired with exactly one history entry,
//! making the change log a complete record and the sole source for
//! rollback.
//!
//! # Key Types
//!
//! - [`MergeEngine`] — the facade
//! - [`EngineError`] — the caller-facing error taxonomy
//! - [`PlatformComparison`] — a customization diffed against its platform base

pub mod engine;
pub mod error;
pub mod rollback;

pub use engine::{MergeEngine, PlatformComparison};
pub use error::{EngineError, EngineResult};

// Re-export the types callers handle through the facade.
pub use strata_custom::{
    AllowAll, Customization, CustomizationFilter, Governance, NewCustomization,
};
pub use strata_history::{ChangeHistoryEntry, ChangeKind, EntityType, HistoryFilter};
pub use strata_impact::{AnalysisReport, ConflictDetail, ImpactRecord};
pub use strata_platform::{
    ManifestChange, ManifestDraft, PlatformSnapshot, SnapshotDraft, UpgradeManifest,
};
pub use strata_resolve::{allowed_choices, Resolution, TenantVersionMarker};
pub use strata_types::{
    Actor, Checksum, CustomizationId, CustomizationKind, HistoryId, ImpactId, ImpactStatus,
    ImpactType, ManifestId, ResolutionChoice, ResourceRef, Severity, TenantId,
};
