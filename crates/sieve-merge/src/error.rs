use sieve_types::NodeError;
use thiserror::Error;

/// Errors that can occur while merging a component condition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The composite root is not a logical condition, or one of its operands
    /// is not a component marker.
    #[error("invalid composite structure: {reason}")]
    InvalidCompositeStructure { reason: String },

    #[error(transparent)]
    Node(#[from] NodeError),
}

impl MergeError {
    pub fn invalid_structure(reason: impl Into<String>) -> Self {
        Self::InvalidCompositeStructure {
            reason: reason.into(),
        }
    }
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
