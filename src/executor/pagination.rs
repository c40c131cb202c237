//! Pagination executor
//!
//! Applies a window (OFFSET/LIMIT) to an ordered, deduplicated row stream.
//! The input is pulled at most `offset + limit` times: once the limit is
//! reached no further row is requested, so lazily produced inputs are never
//! scanned past the window.

use async_trait::async_trait;
use tracing::trace;

use crate::planner::Window;

use super::error::ExecutorResult;
use super::row::Row;
use super::Executor;

/// Pagination executor
pub struct Pagination {
    /// Input executor
    input: Box<dyn Executor>,
    window: Window,
    /// Rows skipped so far
    skipped: u64,
    /// Rows returned so far
    returned: u64,
    /// Input reported end of stream
    exhausted: bool,
}

impl Pagination {
    pub fn new(input: Box<dyn Executor>, window: Window) -> Self {
        Pagination {
            input,
            window,
            skipped: 0,
            returned: 0,
            exhausted: false,
        }
    }

    fn limit_reached(&self) -> bool {
        self.window.limit.is_some_and(|limit| self.returned >= limit)
    }
}

/// Wrap a row stream in a window
pub fn paginate(rows: Box<dyn Executor>, window: Window) -> Box<dyn Executor> {
    if window.is_unbounded() {
        return rows;
    }
    Box::new(Pagination::new(rows, window))
}

#[async_trait]
impl Executor for Pagination {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.skipped = 0;
        self.returned = 0;
        self.exhausted = false;
        self.input.open().await
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if self.exhausted || self.limit_reached() {
            return Ok(None);
        }

        while self.skipped < self.window.offset {
            if self.input.next().await?.is_none() {
                self.exhausted = true;
                trace!(skipped = self.skipped, "input ended inside offset");
                return Ok(None);
            }
            self.skipped += 1;
        }

        match self.input.next().await? {
            Some(row) => {
                self.returned += 1;
                Ok(Some(row))
            }
            None => {
                self.exhausted = true;
                Ok(None)
            }
        }
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        trace!(
            skipped = self.skipped,
            returned = self.returned,
            window = %self.window,
            "pagination closed"
        );
        self.input.close().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::executor::collect_rows;
    use crate::executor::test_utils::{first_ints, MockExecutor};

    async fn page(total: i64, window: Window) -> (Vec<i64>, usize) {
        let input = MockExecutor::ints(0..total);
        let pulled = input.pulled();
        let mut exec = Pagination::new(Box::new(input), window);
        let rows = collect_rows(&mut exec).await.unwrap();
        (first_ints(&rows), pulled.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_limit_only() {
        let (rows, pulled) = page(10, Window::new(0, Some(3))).await;
        assert_eq!(rows, vec![0, 1, 2]);
        assert_eq!(pulled, 3);
    }

    #[tokio::test]
    async fn test_offset_only() {
        let (rows, pulled) = page(5, Window::new(3, None)).await;
        assert_eq!(rows, vec![3, 4]);
        assert_eq!(pulled, 5);
    }

    #[tokio::test]
    async fn test_limit_and_offset() {
        let (rows, pulled) = page(100, Window::new(10, Some(20))).await;
        assert_eq!(rows, (10..30).collect::<Vec<_>>());
        // Never pulls past offset + limit
        assert_eq!(pulled, 30);
    }

    #[tokio::test]
    async fn test_offset_past_end() {
        let (rows, pulled) = page(5, Window::new(10, Some(20))).await;
        assert!(rows.is_empty());
        assert_eq!(pulled, 5);
    }

    #[tokio::test]
    async fn test_short_last_page() {
        let (rows, _) = page(46, Window::new(30, Some(20))).await;
        assert_eq!(rows, (30..46).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_no_pull_after_limit() {
        let input = MockExecutor::ints(0..10);
        let pulled = input.pulled();
        let mut exec = Pagination::new(Box::new(input), Window::new(2, Some(1)));
        exec.open().await.unwrap();
        assert!(exec.next().await.unwrap().is_some());
        assert!(exec.next().await.unwrap().is_none());
        assert!(exec.next().await.unwrap().is_none());
        assert_eq!(pulled.load(Ordering::SeqCst), 3);
        exec.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_reopen_restarts_window() {
        let mut exec = Pagination::new(Box::new(MockExecutor::ints(0..10)), Window::new(4, Some(2)));
        let first = collect_rows(&mut exec).await.unwrap();
        let second = collect_rows(&mut exec).await.unwrap();
        assert_eq!(first_ints(&first), vec![4, 5]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_paginate_unbounded_passthrough() {
        let mut exec = paginate(Box::new(MockExecutor::ints(0..4)), Window::all());
        let rows = collect_rows(exec.as_mut()).await.unwrap();
        assert_eq!(first_ints(&rows), vec![0, 1, 2, 3]);
    }
}
