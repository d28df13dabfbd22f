use strata_types::{ManifestId, ResourceRef};
use thiserror::Error;

/// Errors produced by platform store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("snapshot {resource} at platform version {version} is immutable and differs from the published body")]
    SnapshotImmutable { resource: ResourceRef, version: String },

    #[error("no snapshot for {resource} at platform version {version}")]
    SnapshotNotFound { resource: ResourceRef, version: String },

    #[error("platform version {version} has no published snapshots")]
    VersionNotFound { version: String },

    #[error("manifest {id} not found")]
    ManifestNotFound { id: ManifestId },

    #[error(transparent)]
    Canon(#[from] strata_canon::CanonError),
}

/// Convenience result alias for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
