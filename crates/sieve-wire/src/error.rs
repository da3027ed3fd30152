use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("invalid scalar type: {0}")]
    InvalidScalarType(String),

    #[error("invalid {scalar_type} value: {reason}")]
    InvalidScalarValue { scalar_type: String, reason: String },

    /// An empty component marker sits under an operator that needs every operand.
    #[error("operator '{operator}' has an operand with no condition")]
    UnresolvedOperand { operator: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl WireError {
    pub fn invalid_value(scalar_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidScalarValue {
            scalar_type: scalar_type.into(),
            reason: reason.into(),
        }
    }
}

pub type WireResult<T> = Result<T, WireError>;
