//! Validated query plan
//!
//! A `QueryPlan` is the immutable result of `QueryPlanBuilder::build`. Its
//! ORDER BY directives are already resolved to keys over output columns, so
//! executors never look up aliases.

use std::fmt;

use crate::catalog::DataType;
use crate::projection::{
    Literal, OrderDirective, Predicate, ProjectionExpr, ProjectionList, ScalarFunction,
};

use super::compile::{CompiledPlan, PlanRenderer};
use super::error::{PlannerError, PlannerResult};
use super::window::Window;

/// Lifecycle of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanState {
    /// Projections, filters and directives still being accumulated
    Building,
    /// Aliases resolved and DISTINCT/grouping rules checked
    Validated,
    /// Rendered for a backend; executable
    Compiled,
}

/// Queried entity and the alias column references use for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySource {
    pub entity: String,
    pub alias: String,
}

impl EntitySource {
    /// Query root: entity name and the alias property references use
    pub fn new(entity: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            alias: alias.into(),
        }
    }
}

impl fmt::Display for EntitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity, self.alias)
    }
}

/// Output column of a plan
#[derive(Debug, Clone, PartialEq)]
pub struct OutputColumn {
    /// Position in the output tuple
    pub index: usize,
    /// Alias, or a name derived from the expression
    pub name: String,
    /// Alias as declared, `None` for positional binding
    pub alias: Option<String>,
    /// Statically known type (property types are only known to backends)
    pub data_type: Option<DataType>,
    /// Sort-only column, trimmed before rows leave the backend
    pub hidden: bool,
}

/// Sort key computed from a projected output tuple
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    /// Output column value
    Output(usize),
    /// Constant
    Literal(Literal),
    /// Function over other keys
    Function {
        func: ScalarFunction,
        args: Vec<SortKey>,
    },
}

impl SortKey {
    /// Visit every output column the key reads
    pub fn for_each_output(&self, f: &mut impl FnMut(usize)) {
        match self {
            SortKey::Output(i) => f(*i),
            SortKey::Literal(_) => {}
            SortKey::Function { args, .. } => {
                for arg in args {
                    arg.for_each_output(f);
                }
            }
        }
    }
}

/// ORDER BY directive together with its resolved key
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOrder {
    pub directive: OrderDirective,
    pub key: SortKey,
}

impl ResolvedOrder {
    /// Check if this key sorts ascending
    pub fn ascending(&self) -> bool {
        self.directive.direction.is_ascending()
    }
}

/// Validated, immutable query plan
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub(crate) source: EntitySource,
    pub(crate) projections: ProjectionList,
    pub(crate) hidden: Vec<ProjectionExpr>,
    pub(crate) columns: Vec<OutputColumn>,
    pub(crate) distinct: bool,
    pub(crate) grouped: bool,
    pub(crate) filter: Option<Predicate>,
    pub(crate) order_by: Vec<ResolvedOrder>,
    pub(crate) window: Window,
}

impl QueryPlan {
    /// Lifecycle state; always `Validated` for a built plan
    pub fn state(&self) -> PlanState {
        PlanState::Validated
    }

    /// Root entity and its alias
    pub fn source(&self) -> &EntitySource {
        &self.source
    }

    /// The projection list as declared
    pub fn projections(&self) -> &ProjectionList {
        &self.projections
    }

    /// Sort-only expressions appended after the declared projections
    pub fn hidden_projections(&self) -> &[ProjectionExpr] {
        &self.hidden
    }

    /// Visible output columns, aligned 1:1 with the projection list
    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns[..self.projections.len()]
    }

    /// Visible and hidden output columns
    pub fn all_columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    /// Number of visible output columns
    pub fn width(&self) -> usize {
        self.projections.len()
    }

    /// Resolved ORDER BY keys, most significant first
    pub fn order_by(&self) -> &[ResolvedOrder] {
        &self.order_by
    }

    /// Requested page window
    pub fn window(&self) -> Window {
        self.window
    }

    /// Combined filter, if any restriction was added
    pub fn filter(&self) -> Option<&Predicate> {
        self.filter.as_ref()
    }

    /// Check if duplicate output rows are removed
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Check if the plan aggregates over groups
    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    /// Visible and hidden expressions, in output order
    pub fn output_exprs(&self) -> impl Iterator<Item = &ProjectionExpr> {
        self.projections
            .iter()
            .map(|p| &p.expr)
            .chain(self.hidden.iter())
    }

    /// Same plan over a different window
    ///
    /// Re-applies the window checks; everything else was already validated.
    pub fn with_window(&self, window: Window) -> PlannerResult<QueryPlan> {
        check_window(&window, !self.order_by.is_empty())?;
        let mut plan = self.clone();
        plan.window = window;
        Ok(plan)
    }

    /// Render the plan for a backend
    pub fn compile(self, renderer: &dyn PlanRenderer) -> PlannerResult<CompiledPlan> {
        CompiledPlan::new(self, renderer)
    }
}

pub(crate) fn check_window(window: &Window, ordered: bool) -> PlannerResult<()> {
    window.validate()?;
    if window.offset > 0 && !ordered {
        return Err(PlannerError::OrderingRequiredForPagination {
            offset: window.offset,
        });
    }
    Ok(())
}
