use thiserror::Error;

/// Errors produced by patch application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("invalid JSON pointer: {0}")]
    InvalidPointer(String),

    #[error("path not found: {path}")]
    PathNotFound { path: String },

    #[error("cannot descend into non-object at {path}")]
    NotAnObject { path: String },

    #[error("operation at {path} requires a value")]
    MissingValue { path: String },

    #[error("cannot remove the document root")]
    CannotRemoveRoot,
}

/// Convenience result alias for diff operations.
pub type DiffResult<T> = Result<T, DiffError>;
