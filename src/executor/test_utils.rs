//! Shared test utilities for executor tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::datum::Datum;
use super::error::ExecutorResult;
use super::row::Row;
use super::Executor;

/// In-memory executor that counts how many rows were pulled from it
pub struct MockExecutor {
    rows: Vec<Row>,
    position: usize,
    pulled: Arc<AtomicUsize>,
}

impl MockExecutor {
    pub fn new(rows: Vec<Row>) -> Self {
        MockExecutor {
            rows,
            position: 0,
            pulled: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Single-column integer rows
    pub fn ints(values: impl IntoIterator<Item = i64>) -> Self {
        Self::new(
            values
                .into_iter()
                .map(|i| Row::new(vec![Datum::Int(i)]))
                .collect(),
        )
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Counter shared with the executor, readable after it is boxed
    pub fn pulled(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.pulled)
    }
}

#[async_trait]
impl Executor for MockExecutor {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.position = 0;
        Ok(())
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if self.position >= self.rows.len() {
            return Ok(None);
        }
        let row = self.rows[self.position].clone();
        self.position += 1;
        self.pulled.fetch_add(1, Ordering::SeqCst);
        Ok(Some(row))
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        Ok(())
    }
}

/// First column of each row as an integer
pub fn first_ints(rows: &[Row]) -> Vec<i64> {
    rows.iter()
        .map(|r| r.get(0).ok().and_then(Datum::as_int).unwrap_or(i64::MIN))
        .collect()
}
