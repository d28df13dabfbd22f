use thiserror::Error;

/// Errors produced by canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonError {
    #[error("body exceeds maximum nesting depth of {max}")]
    TooDeep { max: usize },

    #[error("serialization error: {0}")]
    Serialization(String),
}
