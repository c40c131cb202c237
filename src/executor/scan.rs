//! Snapshot scan executor
//!
//! Streams the rows of an entity from an immutable snapshot taken when the
//! executor tree was built. Concurrent inserts into the backend do not affect
//! a running scan.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use super::error::ExecutorResult;
use super::row::Row;
use super::Executor;

/// Scan over a shared row snapshot
pub struct SnapshotScan {
    /// Entity name, for tracing
    entity: String,
    rows: Arc<Vec<Row>>,
    position: usize,
}

impl SnapshotScan {
    /// Create a scan over a snapshot of `entity` rows
    pub fn new(entity: impl Into<String>, rows: Arc<Vec<Row>>) -> Self {
        SnapshotScan {
            entity: entity.into(),
            rows,
            position: 0,
        }
    }
}

#[async_trait]
impl Executor for SnapshotScan {
    async fn open(&mut self) -> ExecutorResult<()> {
        trace!(entity = %self.entity, rows = self.rows.len(), "scan opened");
        self.position = 0;
        Ok(())
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        let row = self.rows.get(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        trace!(entity = %self.entity, emitted = self.position, "scan closed");
        Ok(())
    }
}
