//! Query description types
//!
//! Projection trees, ORDER BY directives and filter predicates, as built by
//! callers before planning.

pub mod expr;
pub mod function;
pub mod list;
pub mod order;
pub mod predicate;

pub use expr::{AggregateKind, ColumnRef, Literal, ProjectionExpr};
pub use function::{Arity, ScalarFunction};
pub use list::{AliasedProjection, DistinctSpec, ProjectionList, Projections, Selection};
pub use order::{Direction, OrderDirective, OrderTarget};
pub use predicate::{CompareOp, Predicate, Restrictions};
