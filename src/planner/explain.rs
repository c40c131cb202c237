//! EXPLAIN output formatting
//!
//! Formats a plan as the operator tree a backend executes, outermost
//! operator first.

use std::fmt::{self, Write};

use crate::planner::plan::QueryPlan;

/// Format a query plan for EXPLAIN output
pub struct ExplainOutput;

impl ExplainOutput {
    /// Format a plan as a string
    pub fn format(plan: &QueryPlan) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail
        let _ = Self::format_plan(plan, &mut output);
        output
    }

    fn format_plan(plan: &QueryPlan, out: &mut String) -> fmt::Result {
        let mut indent = 0;
        let mut line = |out: &mut String, text: String| -> fmt::Result {
            writeln!(out, "{}{}", "  ".repeat(indent), text)?;
            indent += 1;
            Ok(())
        };

        let window = plan.window();
        if !window.is_unbounded() {
            line(out, format!("Pagination: {}", window))?;
        }

        if !plan.hidden_projections().is_empty() {
            line(out, format!("Trim: keep {} columns", plan.width()))?;
        }

        if !plan.order_by().is_empty() {
            let keys: Vec<_> = plan
                .order_by()
                .iter()
                .map(|o| o.directive.to_string())
                .collect();
            line(out, format!("Sort: [{}]", keys.join(", ")))?;
        }

        if plan.is_distinct() {
            line(out, "HashDistinct".to_string())?;
        }

        let names: Vec<_> = plan
            .all_columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        if plan.is_grouped() {
            let groups = plan.projections().iter().filter(|p| p.grouped).count();
            line(
                out,
                format!(
                    "HashAggregate: [{}] ({} group keys)",
                    names.join(", "),
                    groups
                ),
            )?;
        } else {
            line(out, format!("Project: [{}]", names.join(", ")))?;
        }

        if let Some(filter) = plan.filter() {
            line(out, format!("Filter: {}", filter))?;
        }

        line(out, format!("Scan: {}", plan.source()))
    }
}
