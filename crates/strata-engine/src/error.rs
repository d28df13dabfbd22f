use strata_canon::CanonError;
use strata_custom::CustomError;
use strata_diff::DiffError;
use strata_history::HistoryError;
use strata_impact::ImpactError;
use strata_platform::PlatformError;
use strata_resolve::ResolveError;
use strata_types::ImpactId;
use thiserror::Error;

/// The caller-facing error taxonomy of the engine boundary.
///
/// Component errors are folded into a handful of classes so callers can
/// decide how to react without knowing the internal crate layout:
/// validation and state errors are caller mistakes, conflicts invite a
/// read-retry, integrity errors mean stored data contradicts itself and
/// needs manual review.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed or rejected input. Never retried automatically.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A write supplied a stale version. Carries the current version so
    /// the caller can re-read and decide; the engine never retries on the
    /// caller's behalf.
    #[error("stale version: expected {expected}, current is {current}")]
    Conflict { expected: u64, current: u64 },

    #[error("not found: {0}")]
    NotFound(String),

    /// The operation is illegal in the entity's current state.
    #[error("illegal state: {0}")]
    State(String),

    /// Upgrade blocked by unresolved high or critical impact records.
    #[error("upgrade blocked by {} unresolved impact record(s)", blockers.len())]
    Blocked { blockers: Vec<ImpactId> },

    /// Stored state contradicts itself (a base checksum matching no known
    /// snapshot). Surfaced for manual review, never silently passed.
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<CanonError> for EngineError {
    fn from(err: CanonError) -> Self {
        match err {
            CanonError::TooDeep { .. } => Self::Validation(err.to_string()),
            CanonError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<DiffError> for EngineError {
    fn from(err: DiffError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<HistoryError> for EngineError {
    fn from(err: HistoryError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<PlatformError> for EngineError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::SnapshotImmutable { .. } => Self::State(err.to_string()),
            PlatformError::SnapshotNotFound { .. }
            | PlatformError::VersionNotFound { .. }
            | PlatformError::ManifestNotFound { .. } => Self::NotFound(err.to_string()),
            PlatformError::Canon(e) => e.into(),
        }
    }
}

impl From<CustomError> for EngineError {
    fn from(err: CustomError) -> Self {
        match err {
            CustomError::VersionConflict { expected, current } => {
                Self::Conflict { expected, current }
            }
            CustomError::NotFound { id } => Self::NotFound(format!("customization {id}")),
            CustomError::Canon(e) => e.into(),
            CustomError::Platform(e) => e.into(),
            e @ (CustomError::Inactive { .. } | CustomError::ActiveCustomizationExists { .. }) => {
                Self::State(e.to_string())
            }
            e => Self::Validation(e.to_string()),
        }
    }
}

impl From<ImpactError> for EngineError {
    fn from(err: ImpactError) -> Self {
        match err {
            ImpactError::NotFound { id } => Self::NotFound(format!("impact record {id}")),
            ImpactError::DuplicateScope { .. } => Self::State(err.to_string()),
            ImpactError::Serialization(msg) => Self::Internal(msg),
            ImpactError::Canon(e) => e.into(),
            ImpactError::Diff(e) => e.into(),
            ImpactError::Platform(e) => e.into(),
            ImpactError::Custom(e) => e.into(),
            ImpactError::History(e) => e.into(),
        }
    }
}

impl From<ResolveError> for EngineError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::ImpactNotFound { id } => Self::NotFound(format!("impact record {id}")),
            ResolveError::ManifestNotFound { id } => Self::NotFound(format!("manifest {id}")),
            ResolveError::CustomizationNotFound { id } => {
                Self::NotFound(format!("customization {id}"))
            }
            e @ (ResolveError::IllegalChoice { .. }
            | ResolveError::MissingCustomValue
            | ResolveError::SchemaRejected { .. }) => Self::Validation(e.to_string()),
            e @ (ResolveError::AlreadyTerminal { .. }
            | ResolveError::IllegalTransition { .. }
            | ResolveError::NotAutoMergeable { .. }
            | ResolveError::VersionSkew { .. }) => Self::State(e.to_string()),
            ResolveError::BlockedByImpacts { blockers } => Self::Blocked { blockers },
            ResolveError::MarkerConflict { expected, current } => {
                Self::Conflict { expected, current }
            }
            ResolveError::Serialization(msg) => Self::Internal(msg),
            ResolveError::Custom(e) => e.into(),
            ResolveError::Impact(e) => e.into(),
            ResolveError::Platform(e) => e.into(),
            ResolveError::Diff(e) => e.into(),
            ResolveError::History(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_version_maps_to_conflict() {
        let err: EngineError = CustomError::VersionConflict {
            expected: 1,
            current: 3,
        }
        .into();
        assert_eq!(
            err,
            EngineError::Conflict {
                expected: 1,
                current: 3
            }
        );
    }

    #[test]
    fn blockers_survive_the_mapping() {
        let blockers = vec![ImpactId::new(), ImpactId::new()];
        let err: EngineError = ResolveError::BlockedByImpacts {
            blockers: blockers.clone(),
        }
        .into();
        assert_eq!(err, EngineError::Blocked { blockers });
    }

    #[test]
    fn schema_rejection_is_a_validation_error() {
        let err: EngineError = ResolveError::SchemaRejected {
            reason: "bad shape".into(),
        }
        .into();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn terminal_record_is_a_state_error() {
        let err: EngineError = ResolveError::AlreadyTerminal {
            id: ImpactId::new(),
            status: strata_types::ImpactStatus::Resolved,
        }
        .into();
        assert!(matches!(err, EngineError::State(_)));
    }

    #[test]
    fn nested_errors_unwrap_to_their_class() {
        let err: EngineError = ResolveError::Custom(CustomError::VersionConflict {
            expected: 2,
            current: 4,
        })
        .into();
        assert_eq!(
            err,
            EngineError::Conflict {
                expected: 2,
                current: 4
            }
        );
    }
}
