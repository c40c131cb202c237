//! Executor engine
//!
//! Builds executor trees from validated query plans:
//!
//! ```text
//! Scan -> Filter -> (Aggregate | Project) -> Distinct -> Sort -> Trim [-> Pagination]
//! ```
//!
//! Rows leaving the tree are aligned 1:1 with the plan's projection list.
//! Pagination is only attached when the caller asks for it; normally the
//! session pages the stream itself.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::EntityDef;
use crate::config::NullOrdering;
use crate::planner::QueryPlan;
use crate::projection::ProjectionExpr;

use super::aggregate::{AggregateCall, AggregateSlot, HashAggregate};
use super::datum::Datum;
use super::distinct::HashDistinct;
use super::error::ExecutorResult;
use super::eval::{BoundExpr, BoundPredicate};
use super::filter::Filter;
use super::pagination::paginate;
use super::project::Project;
use super::row::Row;
use super::scan::SnapshotScan;
use super::sort::{Sort, SortSpec};
use super::trim::Trim;
use super::Executor;

/// Executor engine - builds executors from query plans
pub struct ExecutorEngine {
    entity: EntityDef,
    /// Entity rows, in property order
    rows: Arc<Vec<Row>>,
    nulls: NullOrdering,
    /// Attach the plan's window to the tree
    apply_window: bool,
}

impl ExecutorEngine {
    pub fn new(entity: EntityDef, rows: Arc<Vec<Row>>) -> Self {
        ExecutorEngine {
            entity,
            rows,
            nulls: NullOrdering::default(),
            apply_window: false,
        }
    }

    #[must_use]
    pub fn null_ordering(mut self, nulls: NullOrdering) -> Self {
        self.nulls = nulls;
        self
    }

    #[must_use]
    pub fn apply_window(mut self, apply: bool) -> Self {
        self.apply_window = apply;
        self
    }

    /// Build an executor tree for a plan
    pub fn build(&self, plan: &QueryPlan) -> ExecutorResult<Box<dyn Executor>> {
        let mut exec: Box<dyn Executor> = Box::new(SnapshotScan::new(
            self.entity.name.clone(),
            Arc::clone(&self.rows),
        ));

        if let Some(predicate) = plan.filter() {
            let bound = BoundPredicate::bind(predicate, &self.entity)?;
            exec = Box::new(Filter::new(exec, bound));
        }

        exec = if plan.is_grouped() {
            let slots = plan
                .projections()
                .iter()
                .map(|p| self.bind_slot(&p.expr, p.grouped))
                .collect::<ExecutorResult<Vec<_>>>()?;
            Box::new(HashAggregate::new(exec, slots))
        } else {
            let exprs = plan
                .output_exprs()
                .map(|e| BoundExpr::bind(e, &self.entity))
                .collect::<ExecutorResult<Vec<_>>>()?;
            Box::new(Project::new(exec, exprs))
        };

        if plan.is_distinct() {
            exec = Box::new(HashDistinct::new(exec));
        }

        if !plan.order_by().is_empty() {
            let keys = plan
                .order_by()
                .iter()
                .map(|o| SortSpec {
                    expr: BoundExpr::from_sort_key(&o.key),
                    ascending: o.ascending(),
                })
                .collect();
            exec = Box::new(Sort::new(exec, keys, self.nulls));
        }

        if !plan.hidden_projections().is_empty() {
            exec = Box::new(Trim::new(exec, plan.width()));
        }

        if self.apply_window {
            exec = paginate(exec, plan.window());
        }

        debug!(
            entity = %self.entity.name,
            grouped = plan.is_grouped(),
            distinct = plan.is_distinct(),
            sort_keys = plan.order_by().len(),
            hidden = plan.hidden_projections().len(),
            paged = self.apply_window,
            "executor tree built"
        );

        Ok(exec)
    }

    fn bind_slot(&self, expr: &ProjectionExpr, grouped: bool) -> ExecutorResult<AggregateSlot> {
        if grouped {
            return Ok(AggregateSlot::Group(BoundExpr::bind(expr, &self.entity)?));
        }
        match expr {
            ProjectionExpr::Aggregate {
                func,
                arg,
                distinct,
            } => {
                let arg = arg
                    .as_deref()
                    .map(|a| BoundExpr::bind(a, &self.entity))
                    .transpose()?;
                Ok(AggregateSlot::Aggregate(AggregateCall {
                    kind: *func,
                    arg,
                    distinct: *distinct,
                }))
            }
            ProjectionExpr::Literal(lit) => Ok(AggregateSlot::Constant(Datum::from_literal(lit))),
            other => Ok(AggregateSlot::Group(BoundExpr::bind(other, &self.entity)?)),
        }
    }
}
