//! Distinct executor
//!
//! Removes duplicate result rows. Equality is over the full output tuple,
//! including sort-only columns, so rows are deduplicated before ordering.
//! Rows stream through in input order; only the seen set is buffered.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::trace;

use super::error::ExecutorResult;
use super::row::Row;
use super::Executor;

/// Hash-based distinct executor
pub struct HashDistinct {
    /// Input executor
    input: Box<dyn Executor>,
    /// Seen rows (for deduplication)
    seen: HashSet<Row>,
    /// Duplicates dropped since open
    dropped: usize,
}

impl HashDistinct {
    /// Create a distinct over full output rows
    pub fn new(input: Box<dyn Executor>) -> Self {
        HashDistinct {
            input,
            seen: HashSet::new(),
            dropped: 0,
        }
    }
}

#[async_trait]
impl Executor for HashDistinct {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.seen.clear();
        self.dropped = 0;
        self.input.open().await
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        while let Some(row) = self.input.next().await? {
            if self.seen.insert(row.clone()) {
                return Ok(Some(row));
            }
            self.dropped += 1;
        }
        Ok(None)
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        trace!(
            distinct = self.seen.len(),
            dropped = self.dropped,
            "distinct closed"
        );
        self.seen.clear();
        self.input.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::collect_rows;
    use crate::executor::datum::Datum;
    use crate::executor::test_utils::{first_ints, MockExecutor};

    #[tokio::test]
    async fn test_distinct_keeps_first_occurrence_order() {
        let mut distinct = HashDistinct::new(Box::new(MockExecutor::ints([1, 2, 1, 3, 2])));
        let out = collect_rows(&mut distinct).await.unwrap();
        assert_eq!(first_ints(&out), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_distinct_full_tuple() {
        // Same id, different second column: both survive
        let rows = vec![
            Row::new(vec![Datum::Int(1), Datum::from("a")]),
            Row::new(vec![Datum::Int(1), Datum::from("b")]),
            Row::new(vec![Datum::Int(1), Datum::from("a")]),
            Row::new(vec![Datum::Int(2), Datum::Null]),
            Row::new(vec![Datum::Int(2), Datum::Null]),
        ];
        let mut distinct = HashDistinct::new(Box::new(MockExecutor::new(rows)));
        let out = collect_rows(&mut distinct).await.unwrap();
        assert_eq!(first_ints(&out), vec![1, 1, 2]);
    }
}
