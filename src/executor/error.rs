//! Executor error types

use thiserror::Error;

use crate::catalog::DataType;

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Opaque error raised by an execution backend
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Executor errors
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// Backend has no such entity
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    /// Entity has no such property
    #[error("property not found: {entity}.{property}")]
    PropertyNotFound { entity: String, property: String },

    /// Column index out of bounds
    #[error("column index {index} out of bounds (row has {row_len} columns)")]
    ColumnIndexOutOfBounds { index: usize, row_len: usize },

    /// Value of the wrong type reached an operator
    #[error("type mismatch in {context}: expected {expected}, got {got}")]
    TypeMismatch {
        expected: DataType,
        got: String,
        context: String,
    },

    /// Invalid operation (e.g. NULL in a NOT NULL property)
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Failure inside the execution backend, propagated unchanged
    #[error("backend error: {0}")]
    Backend(#[source] BackendError),

    /// Internal executor error
    #[error("internal error: {0}")]
    Internal(String),
}

impl ExecutorError {
    /// Wrap any backend failure
    pub fn backend(err: impl Into<BackendError>) -> Self {
        ExecutorError::Backend(err.into())
    }
}
