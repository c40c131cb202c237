//! Query planner
//!
//! Turns a selection, filter, ORDER BY directives and a paging window into
//! an executable plan.
//!
//! ## Pipeline
//!
//! ```text
//! QueryPlanBuilder (Building)
//!   → QueryPlanBuilder::build() → QueryPlan (Validated)
//!   → QueryPlan::compile(renderer) → CompiledPlan (Compiled)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use quarry::planner::{EntitySource, QueryPlanBuilder, SqlTextRenderer, Window};
//! use quarry::projection::{OrderDirective, Projections};
//!
//! let plan = QueryPlanBuilder::new(EntitySource::new("Entity", "e"), Projections::distinct(list))
//!     .order_by(OrderDirective::alias("LocalizedName"))
//!     .window(Window::new(10, Some(20)))
//!     .build()?;
//! let compiled = plan.compile(&SqlTextRenderer)?;
//! ```

pub mod builder;
pub mod compile;
pub mod error;
pub mod explain;
pub mod plan;
pub mod window;

pub use builder::{build, QueryPlanBuilder};
pub use compile::{CompiledPlan, PlanRenderer, SqlTextRenderer};
pub use error::{PlannerError, PlannerResult};
pub use explain::ExplainOutput;
pub use plan::{EntitySource, OutputColumn, PlanState, QueryPlan, ResolvedOrder, SortKey};
pub use window::Window;
