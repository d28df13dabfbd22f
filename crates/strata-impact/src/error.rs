use strata_types::{ImpactId, ResourceRef};
use thiserror::Error;

/// Errors produced by impact analysis and record storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImpactError {
    #[error("impact record {id} not found")]
    NotFound { id: ImpactId },

    #[error("an impact record already exists for {resource} in this analysis scope")]
    DuplicateScope { resource: ResourceRef },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Canon(#[from] strata_canon::CanonError),

    #[error(transparent)]
    Diff(#[from] strata_diff::DiffError),

    #[error(transparent)]
    Platform(#[from] strata_platform::PlatformError),

    #[error(transparent)]
    Custom(#[from] strata_custom::CustomError),

    #[error(transparent)]
    History(#[from] strata_history::HistoryError),
}

/// Convenience result alias for impact operations.
pub type ImpactResult<T> = Result<T, ImpactError>;
