use strata_types::{CustomizationId, ImpactId, ImpactStatus, ImpactType, ManifestId, ResolutionChoice};
use thiserror::Error;

/// Errors produced by resolution and upgrade operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("impact record {id} not found")]
    ImpactNotFound { id: ImpactId },

    #[error("manifest {id} not found")]
    ManifestNotFound { id: ManifestId },

    #[error("customization {id} not found")]
    CustomizationNotFound { id: CustomizationId },

    #[error("choice {choice} is not legal for impact type {impact_type}")]
    IllegalChoice {
        choice: ResolutionChoice,
        impact_type: ImpactType,
    },

    #[error("impact record {id} is {status}; no re-resolution without a rollback")]
    AlreadyTerminal { id: ImpactId, status: ImpactStatus },

    #[error("impact record {id} is {status}, which does not allow this transition")]
    IllegalTransition { id: ImpactId, status: ImpactStatus },

    #[error("impact record {id} has conflicts and cannot be auto-resolved")]
    NotAutoMergeable { id: ImpactId },

    #[error("custom_merge requires a caller-supplied merged value")]
    MissingCustomValue,

    #[error("merged value rejected by governance: {reason}")]
    SchemaRejected { reason: String },

    #[error("{blockers:?} must be settled before this upgrade can be applied")]
    BlockedByImpacts { blockers: Vec<ImpactId> },

    #[error("tenant is at platform version {current}, manifest upgrades from {expected}")]
    VersionSkew { current: String, expected: String },

    #[error("stale version marker: expected {expected}, current is {current}")]
    MarkerConflict { expected: u64, current: u64 },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Custom(#[from] strata_custom::CustomError),

    #[error(transparent)]
    Impact(#[from] strata_impact::ImpactError),

    #[error(transparent)]
    Platform(#[from] strata_platform::PlatformError),

    #[error(transparent)]
    Diff(#[from] strata_diff::DiffError),

    #[error(transparent)]
    History(#[from] strata_history::HistoryError),
}

/// Convenience result alias for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
