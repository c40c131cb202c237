//! Plan compilation
//!
//! Compilation hands a validated plan to a backend-specific renderer. The
//! rendered text is kept alongside the plan for diagnostics; the plan itself
//! is frozen behind an `Arc` from here on.

use std::sync::Arc;

use tracing::debug;

use crate::projection::ProjectionExpr;

use super::error::PlannerResult;
use super::plan::{PlanState, QueryPlan, SortKey};

/// Backend-specific rendering of a plan
pub trait PlanRenderer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Render the plan
    fn render(&self, plan: &QueryPlan) -> PlannerResult<String>;
}

/// Compiled, executable plan
#[derive(Debug, Clone)]
pub struct CompiledPlan {
    plan: Arc<QueryPlan>,
    rendered: String,
    renderer: String,
}

impl CompiledPlan {
    pub(crate) fn new(plan: QueryPlan, renderer: &dyn PlanRenderer) -> PlannerResult<Self> {
        let rendered = renderer.render(&plan)?;
        debug!(
            renderer = renderer.name(),
            entity = %plan.source().entity,
            rendered = %rendered,
            "query plan compiled"
        );
        Ok(Self {
            plan: Arc::new(plan),
            rendered,
            renderer: renderer.name().to_string(),
        })
    }

    /// Lifecycle state; always `Compiled`
    pub fn state(&self) -> PlanState {
        PlanState::Compiled
    }

    /// The validated plan this was compiled from
    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    /// Backend rendering (SQL text for SQL backends)
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Name of the renderer that produced `rendered`
    pub fn renderer(&self) -> &str {
        &self.renderer
    }
}

/// Renders a dialect-neutral SQL text
///
/// Used for logging and diagnostics. Paging is rendered with the
/// `OFFSET .. ROWS FETCH NEXT .. ROWS ONLY` clause.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlTextRenderer;

impl SqlTextRenderer {
    fn render_key(plan: &QueryPlan, key: &SortKey, top: bool) -> String {
        match key {
            SortKey::Output(i) => {
                let column = &plan.all_columns()[*i];
                match (&column.alias, top) {
                    (Some(alias), true) => alias.clone(),
                    _ => plan
                        .output_exprs()
                        .nth(*i)
                        .map(ProjectionExpr::to_string)
                        .unwrap_or_else(|| column.name.clone()),
                }
            }
            SortKey::Literal(lit) => lit.to_string(),
            SortKey::Function { func, args } => {
                let args: Vec<_> = args
                    .iter()
                    .map(|a| Self::render_key(plan, a, false))
                    .collect();
                format!("{}({})", func.name(), args.join(", "))
            }
        }
    }
}

impl PlanRenderer for SqlTextRenderer {
    fn name(&self) -> &str {
        "sql-text"
    }

    fn render(&self, plan: &QueryPlan) -> PlannerResult<String> {
        let mut sql = String::from("SELECT ");
        if plan.is_distinct() {
            sql.push_str("DISTINCT ");
        }

        let select: Vec<_> = plan
            .projections()
            .iter()
            .map(|p| match &p.alias {
                Some(alias) => format!("{} AS {}", p.expr, alias),
                None => p.expr.to_string(),
            })
            .collect();
        sql.push_str(&select.join(", "));
        sql.push_str(&format!(" FROM {}", plan.source()));

        if let Some(filter) = plan.filter() {
            sql.push_str(&format!(" WHERE {}", filter));
        }

        if plan.is_grouped() {
            let keys: Vec<_> = plan
                .projections()
                .iter()
                .filter(|p| p.grouped)
                .map(|p| p.expr.to_string())
                .collect();
            if !keys.is_empty() {
                sql.push_str(&format!(" GROUP BY {}", keys.join(", ")));
            }
        }

        if !plan.order_by().is_empty() {
            let order: Vec<_> = plan
                .order_by()
                .iter()
                .map(|o| {
                    format!(
                        "{} {}",
                        Self::render_key(plan, &o.key, true),
                        o.directive.direction
                    )
                })
                .collect();
            sql.push_str(&format!(" ORDER BY {}", order.join(", ")));
        }

        let window = plan.window();
        if window.offset > 0 || window.limit.is_some() {
            sql.push_str(&format!(" OFFSET {} ROWS", window.offset));
            if let Some(limit) = window.limit {
                sql.push_str(&format!(" FETCH NEXT {} ROWS ONLY", limit));
            }
        }

        Ok(sql)
    }
}
