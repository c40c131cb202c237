//! Filter executor
//!
//! Passes through rows for which the predicate is TRUE; FALSE and unknown
//! (NULL) rows are dropped.

use async_trait::async_trait;

use super::datum::Datum;
use super::error::ExecutorResult;
use super::eval::{eval_predicate, BoundPredicate};
use super::row::Row;
use super::Executor;

/// Filter executor
pub struct Filter {
    /// Input executor
    input: Box<dyn Executor>,
    predicate: BoundPredicate,
}

impl Filter {
    /// Create a filter over `input` that keeps rows matching `predicate`
    pub fn new(input: Box<dyn Executor>, predicate: BoundPredicate) -> Self {
        Filter { input, predicate }
    }
}

#[async_trait]
impl Executor for Filter {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.input.open().await
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        while let Some(row) = self.input.next().await? {
            if eval_predicate(&self.predicate, &row)? == Datum::Bool(true) {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        self.input.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::collect_rows;
    use crate::executor::eval::BoundExpr;
    use crate::executor::test_utils::{first_ints, MockExecutor};
    use crate::projection::CompareOp;

    #[tokio::test]
    async fn test_filter_drops_false_and_unknown() {
        let rows = vec![
            Row::new(vec![Datum::Int(1), Datum::from("a")]),
            Row::new(vec![Datum::Int(2), Datum::Null]),
            Row::new(vec![Datum::Int(3), Datum::from("b")]),
        ];
        // col1 <> 'a'
        let predicate = BoundPredicate::Compare {
            left: BoundExpr::Column(1),
            op: CompareOp::NotEq,
            right: BoundExpr::Literal(Datum::from("a")),
        };

        let mut filter = Filter::new(Box::new(MockExecutor::new(rows)), predicate);
        let out = collect_rows(&mut filter).await.unwrap();
        assert_eq!(first_ints(&out), vec![3]);
    }
}
