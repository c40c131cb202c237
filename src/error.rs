//! Crate-level error type

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::executor::ExecutorError;
use crate::planner::PlannerError;
use crate::transform::TransformError;

/// Result type for session operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Any failure a query can report
#[derive(Error, Debug)]
pub enum QueryError {
    /// Plan rejected at build or compile time
    #[error("plan error: {0}")]
    Planner(#[from] PlannerError),

    /// Execution or backend failure
    #[error("execution error: {0}")]
    Executor(#[from] ExecutorError),

    /// Row could not be transformed (fail-fast mode)
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
