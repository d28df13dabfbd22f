use strata_types::{CustomizationId, ResourceRef};
use thiserror::Error;

/// Errors produced by customization store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomError {
    #[error("an active customization already exists for {resource} in tenant {tenant}")]
    ActiveCustomizationExists { tenant: String, resource: ResourceRef },

    #[error("customization kind {kind} requires a base platform version")]
    MissingBaseVersion { kind: String },

    #[error("no platform snapshot for {resource} at version {version}")]
    SnapshotRequired { resource: ResourceRef, version: String },

    #[error("a platform resource already exists for {resource} at version {version}; use an override instead of a new resource")]
    PlatformKeyCollision { resource: ResourceRef, version: String },

    #[error("resource {resource} is not marked extensible")]
    NotExtensible { resource: ResourceRef },

    #[error("body rejected by governance: {reason}")]
    SchemaRejected { reason: String },

    #[error("customization {id} not found")]
    NotFound { id: CustomizationId },

    #[error("customization {id} is not the active version")]
    Inactive { id: CustomizationId },

    #[error("stale version: expected {expected}, current is {current}")]
    VersionConflict { expected: u64, current: u64 },

    #[error(transparent)]
    Canon(#[from] strata_canon::CanonError),

    #[error(transparent)]
    Platform(#[from] strata_platform::PlatformError),
}

/// Convenience result alias for customization operations.
pub type CustomResult<T> = Result<T, CustomError>;
