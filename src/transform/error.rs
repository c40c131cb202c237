//! Result transformation errors

use thiserror::Error;

use crate::catalog::DataType;

/// Result type for transform operations
pub type TransformResult<T> = Result<T, TransformError>;

/// Per-row transformation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// Row has more values than the target has fields
    #[error("{target} has {expected} fields but the row has {got} values")]
    FieldCountMismatch {
        target: String,
        expected: usize,
        got: usize,
    },

    /// Value cannot be coerced to the field's declared type
    #[error("field '{field}': cannot convert {got} to {expected}")]
    FieldTypeMismatch {
        field: String,
        expected: DataType,
        got: String,
    },

    /// Alias names no field of the target
    #[error("{target} has no field '{field}'")]
    UnknownField { target: String, field: String },

    /// Non-nullable field received no value
    #[error("{target}: no value bound to field '{field}'")]
    MissingField { target: String, field: String },

    /// NULL bound to a non-nullable field
    #[error("field '{field}' does not accept NULL")]
    NullNotAllowed { field: String },

    /// Two columns bound to the same field
    #[error("{target}: field '{field}' bound twice")]
    DuplicateField { target: String, field: String },
}
