use thiserror::Error;

/// Errors produced while constructing or validating nodes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// Unknown operator name, or an operand count the operator does not accept.
    #[error("invalid operator '{name}': {reason}")]
    InvalidOperator { name: String, reason: String },

    #[error("field name must not be empty")]
    EmptyFieldName,
}

impl NodeError {
    /// Create an invalid-operator error with a name and reason.
    pub fn invalid_operator(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOperator {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for node construction results.
pub type NodeResult<T> = Result<T, NodeError>;
