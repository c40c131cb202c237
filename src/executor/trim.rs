//! Trim executor
//!
//! Drops sort-only columns once ordering is done, so rows leaving the
//! pipeline line up with the projection list.

use async_trait::async_trait;

use super::error::ExecutorResult;
use super::row::Row;
use super::Executor;

pub struct Trim {
    input: Box<dyn Executor>,
    /// Number of leading columns to keep
    width: usize,
}

impl Trim {
    /// Create a trim keeping the first `width` columns
    pub fn new(input: Box<dyn Executor>, width: usize) -> Self {
        Trim { input, width }
    }
}

#[async_trait]
impl Executor for Trim {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.input.open().await
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        Ok(self.input.next().await?.map(|mut row| {
            row.truncate(self.width);
            row
        }))
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        self.input.close().await
    }
}
