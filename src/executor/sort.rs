//! Sort executor
//!
//! Implements ORDER BY by collecting all rows, sorting them, then emitting.
//! The sort is stable: rows with equal keys keep their input order.

use std::cmp::Ordering;

use async_trait::async_trait;
use tracing::trace;

use crate::config::NullOrdering;

use super::datum::Datum;
use super::error::ExecutorResult;
use super::eval::{eval, BoundExpr};
use super::row::Row;
use super::Executor;

/// A bound sort key
#[derive(Debug, Clone)]
pub struct SortSpec {
    pub expr: BoundExpr,
    pub ascending: bool,
}

/// Sort executor
pub struct Sort {
    /// Input executor
    input: Box<dyn Executor>,
    keys: Vec<SortSpec>,
    nulls: NullOrdering,
    /// Collected and sorted rows
    rows: Vec<Row>,
    /// Current position in sorted rows
    position: usize,
}

impl Sort {
    /// Create a sort over `input` ordered by `keys`
    pub fn new(input: Box<dyn Executor>, keys: Vec<SortSpec>, nulls: NullOrdering) -> Self {
        Sort {
            input,
            keys,
            nulls,
            rows: Vec::new(),
            position: 0,
        }
    }
}

/// Compare two key values, placing NULL according to `nulls`
fn compare_key(a: &Datum, b: &Datum, ascending: bool, nulls: NullOrdering) -> Ordering {
    let cmp = match (a.is_null(), b.is_null(), nulls) {
        (true, false, NullOrdering::Last) => Ordering::Greater,
        (false, true, NullOrdering::Last) => Ordering::Less,
        _ => a.cmp(b),
    };
    if ascending {
        cmp
    } else {
        cmp.reverse()
    }
}

#[async_trait]
impl Executor for Sort {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.input.open().await?;

        // sort_by cannot fail, so keys are evaluated upfront
        let mut keyed_rows: Vec<(Vec<Datum>, Row)> = Vec::new();
        while let Some(row) = self.input.next().await? {
            let keys = self
                .keys
                .iter()
                .map(|k| eval(&k.expr, &row))
                .collect::<ExecutorResult<Vec<_>>>()?;
            keyed_rows.push((keys, row));
        }

        let specs = &self.keys;
        let nulls = self.nulls;
        keyed_rows.sort_by(|(keys_a, _), (keys_b, _)| {
            keys_a
                .iter()
                .zip(keys_b)
                .zip(specs)
                .map(|((a, b), spec)| compare_key(a, b, spec.ascending, nulls))
                .find(|cmp| *cmp != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        trace!(rows = keyed_rows.len(), keys = specs.len(), "sort complete");

        self.rows = keyed_rows.into_iter().map(|(_, row)| row).collect();
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
        self.rows.clear();
        self.position = 0;
        self.input.close().await
    }
}
