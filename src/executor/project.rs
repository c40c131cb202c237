//! Project executor
//!
//! Evaluates the plan's output expressions (visible, then sort-only) over
//! each entity row.

use async_trait::async_trait;

use super::error::ExecutorResult;
use super::eval::{eval, BoundExpr};
use super::row::Row;
use super::Executor;

/// Project executor
pub struct Project {
    /// Input executor
    input: Box<dyn Executor>,
    /// Output expressions in column order
    expressions: Vec<BoundExpr>,
}

impl Project {
    /// Create a projection evaluating `expressions` against each input row
    pub fn new(input: Box<dyn Executor>, expressions: Vec<BoundExpr>) -> Self {
        Project { input, expressions }
    }
}

#[async_trait]
impl Executor for Project {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.input.open().await
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        match self.input.next().await? {
            Some(input_row) => {
                let values = self
                    .expressions
                    .iter()
                    .map(|expr| eval(expr, &input_row))
                    .collect::<ExecutorResult<Vec<_>>>()?;
                Ok(Some(Row::new(values)))
            }
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        self.input.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::collect_rows;
    use crate::executor::datum::Datum;
    use crate::executor::test_utils::MockExecutor;
    use crate::projection::ScalarFunction;

    #[tokio::test]
    async fn test_project_id_and_coalesce() {
        let rows = vec![
            Row::new(vec![Datum::Int(1), Datum::from("Faber"), Datum::Null]),
            Row::new(vec![Datum::Int(2), Datum::Null, Datum::from("dyer")]),
        ];
        let expressions = vec![
            BoundExpr::Column(0),
            BoundExpr::Function {
                func: ScalarFunction::Coalesce,
                args: vec![BoundExpr::Column(1), BoundExpr::Column(2)],
            },
        ];

        let mut project = Project::new(Box::new(MockExecutor::new(rows)), expressions);
        let out = collect_rows(&mut project).await.unwrap();

        assert_eq!(out[0].values(), &[Datum::Int(1), Datum::from("Faber")]);
        assert_eq!(out[1].values(), &[Datum::Int(2), Datum::from("dyer")]);
    }
}
