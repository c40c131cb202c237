//! Planner error types

use thiserror::Error;

use crate::projection::Arity;

/// Plan construction errors
///
/// All of these are terminal for the plan being built; the caller must
/// rebuild from scratch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// Projection list has no items
    #[error("Projection list is empty")]
    EmptyProjection,

    /// Alias declared by more than one projection
    #[error("Alias '{0}' is declared more than once")]
    DuplicateAlias(String),

    /// ORDER BY names an alias the projection list never declared
    #[error("ORDER BY references undeclared alias '{0}'")]
    UnresolvedAlias(String),

    /// ORDER BY repeats an aliased expression instead of naming its alias
    #[error("ORDER BY must reference expression '{expr}' by its alias '{alias}'")]
    AliasedExpressionReference { alias: String, expr: String },

    /// ORDER BY expression is not derivable from the DISTINCT tuple
    #[error("ORDER BY expression '{0}' is not part of the DISTINCT projection")]
    InvalidOrderAfterDistinct(String),

    /// ORDER BY expression is not derivable from the grouped output
    #[error("ORDER BY expression '{0}' is not part of the grouped projection")]
    InvalidOrderAfterGrouping(String),

    /// Offset requested without any ORDER BY
    #[error("Paging with offset {offset} requires at least one ORDER BY directive")]
    OrderingRequiredForPagination { offset: u64 },

    /// Column reference to an alias other than the queried entity's
    #[error("Unknown entity alias '{alias}' (query entity alias is '{expected}')")]
    UnknownEntityAlias { alias: String, expected: String },

    /// Function name not recognised
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    /// Wrong number of function arguments
    #[error("Function '{name}' expects {expected} arguments, got {got}")]
    FunctionArity {
        name: String,
        expected: Arity,
        got: usize,
    },

    /// Aggregate inside another expression
    #[error("Aggregate '{0}' cannot be nested inside another expression")]
    NestedAggregate(String),

    /// Aggregate where only scalar expressions are allowed
    #[error("Aggregate '{expr}' is not allowed in {context}")]
    MisplacedAggregate { expr: String, context: &'static str },

    /// Plain projection in a grouped query
    #[error("Projection '{0}' must be a group property or an aggregate")]
    UngroupedProjection(String),

    /// Malformed paging window
    #[error("Invalid window: {0}")]
    InvalidWindow(String),
}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
