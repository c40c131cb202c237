//! Query executor - Volcano iterator model
//!
//! Each operator implements open/next/close. Rows are pulled one at a time,
//! so a consumer that stops calling `next` stops the whole pipeline; only
//! blocking operators (sort, distinct, aggregate) buffer their input.

pub mod aggregate;
pub mod datum;
pub mod distinct;
pub mod engine;
pub mod error;
pub mod eval;
pub mod filter;
pub mod pagination;
pub mod project;
pub mod row;
pub mod scan;
pub mod sort;
pub mod trim;

#[cfg(test)]
pub(crate) mod test_utils;

pub use datum::Datum;
pub use engine::ExecutorEngine;
pub use error::{BackendError, ExecutorError, ExecutorResult};
pub use pagination::{paginate, Pagination};
pub use row::{ResultRow, Row};

use async_trait::async_trait;

/// Volcano-style iterator executor
///
/// Each operator implements:
/// - `open()`: Initialize the operator
/// - `next()`: Return the next row, or None if exhausted
/// - `close()`: Clean up resources
#[async_trait]
pub trait Executor: Send {
    /// Initialize the executor
    async fn open(&mut self) -> ExecutorResult<()>;

    /// Get the next row, or None if exhausted
    async fn next(&mut self) -> ExecutorResult<Option<Row>>;

    /// Close the executor and release resources
    async fn close(&mut self) -> ExecutorResult<()>;
}

/// Open an executor, drain it and close it
pub async fn collect_rows(executor: &mut dyn Executor) -> ExecutorResult<Vec<Row>> {
    executor.open().await?;
    let mut rows = Vec::new();
    while let Some(row) = executor.next().await? {
        rows.push(row);
    }
    executor.close().await?;
    Ok(rows)
}
