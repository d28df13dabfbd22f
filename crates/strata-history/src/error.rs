use thiserror::Error;

/// Errors produced by history log operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("history storage error: {0}")]
    Storage(String),
}

/// Convenience result alias for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
