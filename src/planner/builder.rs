//! Query plan builder
//!
//! Composes a selection, an optional filter, ORDER BY directives and a
//! paging window into a validated `QueryPlan`.
//!
//! Validation happens in one pass, in this order:
//! 1. projection list is non-empty and aliases are unique
//! 2. every expression references the queried entity and known functions
//! 3. grouping rules (aggregates and group properties)
//! 4. ORDER BY targets resolve to output columns
//! 5. window is well formed and offsets are ordered

use tracing::debug;

use crate::projection::{
    AliasedProjection, OrderDirective, OrderTarget, Predicate, ProjectionExpr, ProjectionList,
    ScalarFunction, Selection,
};

use super::error::{PlannerError, PlannerResult};
use super::plan::{
    check_window, EntitySource, OutputColumn, PlanState, QueryPlan, ResolvedOrder, SortKey,
};
use super::window::Window;

/// Where an expression appears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExprContext {
    Projection,
    Filter,
    Order,
}

/// Builder for query plans
#[derive(Debug, Clone)]
pub struct QueryPlanBuilder {
    source: EntitySource,
    selection: Selection,
    filter: Option<Predicate>,
    order_by: Vec<OrderDirective>,
    window: Window,
}

impl QueryPlanBuilder {
    /// Start a plan over `entity`, referenced as `alias` by column refs
    pub fn new(source: EntitySource, selection: impl Into<Selection>) -> Self {
        Self {
            source,
            selection: selection.into(),
            filter: None,
            order_by: Vec::new(),
            window: Window::all(),
        }
    }

    pub fn state(&self) -> PlanState {
        PlanState::Building
    }

    /// Add a filter; repeated calls are ANDed
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    /// Append an ORDER BY directive
    #[must_use]
    pub fn order_by(mut self, directive: OrderDirective) -> Self {
        self.order_by.push(directive);
        self
    }

    #[must_use]
    pub fn window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Validate and produce an immutable plan
    pub fn build(self) -> PlannerResult<QueryPlan> {
        let entity = self.source.entity.clone();
        match self.build_inner() {
            Ok(plan) => {
                debug!(
                    entity = %plan.source.entity,
                    columns = plan.width(),
                    hidden = plan.hidden.len(),
                    distinct = plan.distinct,
                    grouped = plan.grouped,
                    order_keys = plan.order_by.len(),
                    window = %plan.window,
                    "query plan validated"
                );
                Ok(plan)
            }
            Err(e) => {
                debug!(entity = %entity, error = %e, "query plan rejected");
                Err(e)
            }
        }
    }

    fn build_inner(self) -> PlannerResult<QueryPlan> {
        let (projections, distinct) = self.selection.into_parts();

        // 1. Shape of the projection list
        if projections.is_empty() {
            return Err(PlannerError::EmptyProjection);
        }
        Self::check_aliases(&projections)?;

        // 2. Expressions
        for item in &projections {
            Self::validate_expr(&item.expr, &self.source, ExprContext::Projection, true)?;
        }
        if let Some(filter) = &self.filter {
            let mut result = Ok(());
            filter.for_each_expr(&mut |expr| {
                if result.is_ok() {
                    result = Self::validate_expr(expr, &self.source, ExprContext::Filter, true);
                }
            });
            result?;
        }

        // 3. Grouping
        let grouped = Self::check_grouping(&projections)?;

        // 4. ORDER BY
        let mut hidden: Vec<ProjectionExpr> = Vec::new();
        let mut order_by = Vec::with_capacity(self.order_by.len());
        for directive in self.order_by {
            let key = Self::resolve_order(
                &directive,
                &projections,
                &self.source,
                distinct,
                grouped,
                &mut hidden,
            )?;
            order_by.push(ResolvedOrder { directive, key });
        }

        // 5. Window
        check_window(&self.window, !order_by.is_empty())?;

        let columns = Self::output_columns(&projections, &hidden);

        Ok(QueryPlan {
            source: self.source,
            projections,
            hidden,
            columns,
            distinct,
            grouped,
            filter: self.filter,
            order_by,
            window: self.window,
        })
    }

    fn check_aliases(projections: &ProjectionList) -> PlannerResult<()> {
        let items = projections.items();
        for (i, item) in items.iter().enumerate() {
            if let Some(alias) = &item.alias {
                if items[..i].iter().any(|p| p.alias.as_ref() == Some(alias)) {
                    return Err(PlannerError::DuplicateAlias(alias.clone()));
                }
            }
        }
        Ok(())
    }

    /// Validate entity aliases, functions and aggregate placement
    fn validate_expr(
        expr: &ProjectionExpr,
        source: &EntitySource,
        context: ExprContext,
        top: bool,
    ) -> PlannerResult<()> {
        match expr {
            ProjectionExpr::Column(col) => {
                if col.entity_alias != source.alias {
                    return Err(PlannerError::UnknownEntityAlias {
                        alias: col.entity_alias.clone(),
                        expected: source.alias.clone(),
                    });
                }
                Ok(())
            }
            ProjectionExpr::Literal(_) => Ok(()),
            ProjectionExpr::Function { name, args, .. } => {
                let func = ScalarFunction::lookup(name)
                    .ok_or_else(|| PlannerError::UnknownFunction(name.clone()))?;
                if !func.arity().accepts(args.len()) {
                    return Err(PlannerError::FunctionArity {
                        name: name.clone(),
                        expected: func.arity(),
                        got: args.len(),
                    });
                }
                for arg in args {
                    Self::validate_expr(arg, source, context, false)?;
                }
                Ok(())
            }
            ProjectionExpr::Aggregate { arg, .. } => {
                if context == ExprContext::Filter {
                    return Err(PlannerError::MisplacedAggregate {
                        expr: expr.to_string(),
                        context: "a filter",
                    });
                }
                if !top {
                    return Err(PlannerError::NestedAggregate(expr.to_string()));
                }
                if let Some(arg) = arg {
                    if arg.contains_aggregate() {
                        return Err(PlannerError::NestedAggregate(arg.to_string()));
                    }
                    Self::validate_expr(arg, source, context, false)?;
                }
                Ok(())
            }
        }
    }

    /// Returns whether the plan is grouped
    fn check_grouping(projections: &ProjectionList) -> PlannerResult<bool> {
        let grouped = projections
            .iter()
            .any(|p| p.grouped || p.expr.is_aggregate());
        if !grouped {
            return Ok(false);
        }

        for (i, item) in projections.iter().enumerate() {
            if item.grouped && item.expr.contains_aggregate() {
                return Err(PlannerError::MisplacedAggregate {
                    expr: item.expr.to_string(),
                    context: "a group property",
                });
            }
            let allowed = item.grouped
                || item.expr.is_aggregate()
                || matches!(item.expr, ProjectionExpr::Literal(_));
            if !allowed {
                return Err(PlannerError::UngroupedProjection(item.output_name(i)));
            }
        }
        Ok(true)
    }

    fn resolve_order(
        directive: &OrderDirective,
        projections: &ProjectionList,
        source: &EntitySource,
        distinct: bool,
        grouped: bool,
        hidden: &mut Vec<ProjectionExpr>,
    ) -> PlannerResult<SortKey> {
        let expr = match &directive.target {
            OrderTarget::Alias(alias) => {
                return projections
                    .position_of_alias(alias)
                    .map(SortKey::Output)
                    .ok_or_else(|| PlannerError::UnresolvedAlias(alias.clone()));
            }
            OrderTarget::Expr(expr) => expr,
        };

        Self::validate_expr(expr, source, ExprContext::Order, true)?;

        if let Some((i, item)) = Self::find_projection(projections, expr) {
            if let Some(alias) = &item.alias {
                return Err(PlannerError::AliasedExpressionReference {
                    alias: alias.clone(),
                    expr: expr.to_string(),
                });
            }
            return Ok(SortKey::Output(i));
        }

        if let Some(key) = Self::derive_key(expr, projections) {
            return Ok(key);
        }

        if distinct {
            return Err(PlannerError::InvalidOrderAfterDistinct(expr.to_string()));
        }
        if grouped {
            return Err(PlannerError::InvalidOrderAfterGrouping(expr.to_string()));
        }
        if expr.contains_aggregate() {
            return Err(PlannerError::MisplacedAggregate {
                expr: expr.to_string(),
                context: "ORDER BY of an ungrouped query",
            });
        }

        // Sort on a hidden column appended after the visible ones
        let width = projections.len();
        let slot = match hidden.iter().position(|h| h == expr) {
            Some(pos) => pos,
            None => {
                hidden.push(expr.clone());
                hidden.len() - 1
            }
        };
        Ok(SortKey::Output(width + slot))
    }

    fn find_projection<'a>(
        projections: &'a ProjectionList,
        expr: &ProjectionExpr,
    ) -> Option<(usize, &'a AliasedProjection)> {
        projections.iter().enumerate().find(|(_, p)| &p.expr == expr)
    }

    /// Express `expr` in terms of projected output columns, if possible
    fn derive_key(expr: &ProjectionExpr, projections: &ProjectionList) -> Option<SortKey> {
        if let Some((i, _)) = Self::find_projection(projections, expr) {
            return Some(SortKey::Output(i));
        }
        match expr {
            ProjectionExpr::Literal(lit) => Some(SortKey::Literal(lit.clone())),
            ProjectionExpr::Function { name, args, .. } => {
                let func = ScalarFunction::lookup(name)?;
                let args = args
                    .iter()
                    .map(|a| Self::derive_key(a, projections))
                    .collect::<Option<Vec<_>>>()?;
                Some(SortKey::Function { func, args })
            }
            ProjectionExpr::Column(_) | ProjectionExpr::Aggregate { .. } => None,
        }
    }

    fn output_columns(projections: &ProjectionList, hidden: &[ProjectionExpr]) -> Vec<OutputColumn> {
        let visible = projections.iter().enumerate().map(|(i, p)| OutputColumn {
            index: i,
            name: p.output_name(i),
            alias: p.alias.clone(),
            data_type: p.expr.data_type(),
            hidden: false,
        });
        let width = projections.len();
        let sort_only = hidden.iter().enumerate().map(|(k, expr)| OutputColumn {
            index: width + k,
            name: format!("__order_{}", k),
            alias: None,
            data_type: expr.data_type(),
            hidden: true,
        });
        visible.chain(sort_only).collect()
    }
}

/// Build a plan in one call
pub fn build(
    source: EntitySource,
    selection: impl Into<Selection>,
    filter: Option<Predicate>,
    order_by: impl IntoIterator<Item = OrderDirective>,
    window: Window,
) -> PlannerResult<QueryPlan> {
    let mut builder = QueryPlanBuilder::new(source, selection).window(window);
    if let Some(filter) = filter {
        builder = builder.filter(filter);
    }
    for directive in order_by {
        builder = builder.order_by(directive);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataType;
    use crate::projection::{Projections, Restrictions};

    fn source() -> EntitySource {
        EntitySource::new("Entity", "e")
    }

    fn coalesce() -> ProjectionExpr {
        Projections::sql_function(
            "coalesce",
            DataType::Text,
            [
                Projections::property("e", "EnglishName"),
                Projections::property("e", "GermanName"),
            ],
        )
    }

    fn localized_columns() -> ProjectionList {
        Projections::list()
            .add_as(Projections::property("e", "Id"), "Id")
            .add_as(coalesce(), "LocalizedName")
    }

    #[test]
    fn test_order_by_alias_over_distinct() {
        let plan = QueryPlanBuilder::new(source(), Projections::distinct(localized_columns()))
            .order_by(OrderDirective::alias("LocalizedName"))
            .window(Window::new(10, Some(20)))
            .build()
            .unwrap();

        assert_eq!(plan.state(), PlanState::Validated);
        assert!(plan.is_distinct());
        assert_eq!(plan.order_by()[0].key, SortKey::Output(1));
        assert!(plan.hidden_projections().is_empty());
        assert_eq!(plan.window(), Window::new(10, Some(20)));
    }

    #[test]
    fn test_order_by_unaliased_function() {
        let list = Projections::list()
            .add(Projections::property("e", "Id"))
            .add(coalesce());
        let plan = QueryPlanBuilder::new(source(), Projections::distinct(list))
            .order_by(OrderDirective::asc(coalesce()))
            .window(Window::new(10, Some(20)))
            .build()
            .unwrap();
        assert_eq!(plan.order_by()[0].key, SortKey::Output(1));
    }

    #[test]
    fn test_unresolved_alias() {
        let err = QueryPlanBuilder::new(source(), localized_columns())
            .order_by(OrderDirective::alias("Missing"))
            .build()
            .unwrap_err();
        assert_eq!(err, PlannerError::UnresolvedAlias("Missing".to_string()));
    }

    #[test]
    fn test_aliased_expression_must_use_alias() {
        let err = QueryPlanBuilder::new(source(), localized_columns())
            .order_by(OrderDirective::asc(coalesce()))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            PlannerError::AliasedExpressionReference { ref alias, .. } if alias == "LocalizedName"
        ));
    }

    #[test]
    fn test_distinct_rejects_unprojected_order() {
        let err = QueryPlanBuilder::new(source(), Projections::distinct(localized_columns()))
            .order_by(OrderDirective::asc(Projections::property("e", "GermanName")))
            .build()
            .unwrap_err();
        assert!(matches!(err, PlannerError::InvalidOrderAfterDistinct(_)));
    }

    #[test]
    fn test_distinct_allows_derived_order() {
        let upper = Projections::sql_function("upper", DataType::Text, [coalesce()]);
        let list = Projections::list()
            .add(Projections::property("e", "Id"))
            .add(coalesce());
        let plan = QueryPlanBuilder::new(source(), Projections::distinct(list))
            .order_by(OrderDirective::desc(upper))
            .build()
            .unwrap();
        assert_eq!(
            plan.order_by()[0].key,
            SortKey::Function {
                func: ScalarFunction::Upper,
                args: vec![SortKey::Output(1)],
            }
        );
    }

    #[test]
    fn test_plain_query_gets_hidden_sort_column() {
        let list = Projections::list().add_as(Projections::property("e", "Id"), "Id");
        let german = Projections::property("e", "GermanName");
        let plan = QueryPlanBuilder::new(source(), list)
            .order_by(OrderDirective::asc(german.clone()))
            .order_by(OrderDirective::desc(german.clone()))
            .build()
            .unwrap();

        assert_eq!(plan.hidden_projections(), &[german]);
        assert_eq!(plan.width(), 1);
        assert_eq!(plan.all_columns().len(), 2);
        assert!(plan.all_columns()[1].hidden);
        assert_eq!(plan.order_by()[0].key, SortKey::Output(1));
        assert_eq!(plan.order_by()[1].key, SortKey::Output(1));
    }

    #[test]
    fn test_offset_requires_order() {
        let err = QueryPlanBuilder::new(source(), localized_columns())
            .window(Window::new(10, Some(20)))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            PlannerError::OrderingRequiredForPagination { offset: 10 }
        );

        // A limit alone is fine
        QueryPlanBuilder::new(source(), localized_columns())
            .window(Window::new(0, Some(20)))
            .build()
            .unwrap();
    }

    #[test]
    fn test_duplicate_alias_and_empty() {
        let list = Projections::list()
            .add_as(Projections::property("e", "Id"), "x")
            .add_as(Projections::property("e", "GermanName"), "x");
        assert_eq!(
            QueryPlanBuilder::new(source(), list).build().unwrap_err(),
            PlannerError::DuplicateAlias("x".to_string())
        );
        assert_eq!(
            QueryPlanBuilder::new(source(), Projections::list())
                .build()
                .unwrap_err(),
            PlannerError::EmptyProjection
        );
    }

    #[test]
    fn test_unknown_function_and_arity() {
        let bad = Projections::sql_function("soundex", DataType::Text, [coalesce()]);
        assert_eq!(
            QueryPlanBuilder::new(source(), Projections::list().add(bad))
                .build()
                .unwrap_err(),
            PlannerError::UnknownFunction("soundex".to_string())
        );

        let bad = Projections::sql_function("nullif", DataType::Text, [coalesce()]);
        assert!(matches!(
            QueryPlanBuilder::new(source(), Projections::list().add(bad))
                .build()
                .unwrap_err(),
            PlannerError::FunctionArity { got: 1, .. }
        ));
    }

    #[test]
    fn test_unknown_entity_alias() {
        let list = Projections::list().add(Projections::property("x", "Id"));
        assert!(matches!(
            QueryPlanBuilder::new(source(), list).build().unwrap_err(),
            PlannerError::UnknownEntityAlias { .. }
        ));
    }

    #[test]
    fn test_grouping_rules() {
        let list = Projections::list()
            .add(Projections::group_property("e", "GermanName"))
            .add(Projections::row_count().with_alias("n"));
        let plan = QueryPlanBuilder::new(source(), list)
            .order_by(OrderDirective::desc("n"))
            .build()
            .unwrap();
        assert!(plan.is_grouped());

        let list = Projections::list()
            .add(Projections::property("e", "GermanName"))
            .add(Projections::row_count());
        assert_eq!(
            QueryPlanBuilder::new(source(), list).build().unwrap_err(),
            PlannerError::UngroupedProjection("GermanName".to_string())
        );

        let list = Projections::list()
            .add(Projections::group_property("e", "GermanName"))
            .add(Projections::row_count());
        assert!(matches!(
            QueryPlanBuilder::new(source(), list)
                .order_by(OrderDirective::asc(Projections::property("e", "Id")))
                .build()
                .unwrap_err(),
            PlannerError::InvalidOrderAfterGrouping(_)
        ));
    }

    #[test]
    fn test_aggregate_placement() {
        let nested = Projections::sql_function(
            "abs",
            DataType::Double,
            [Projections::sum(Projections::property("e", "n"))],
        );
        assert!(matches!(
            QueryPlanBuilder::new(source(), Projections::list().add(nested))
                .build()
                .unwrap_err(),
            PlannerError::NestedAggregate(_)
        ));

        let filter = Restrictions::gt(Projections::row_count(), 1);
        assert!(matches!(
            QueryPlanBuilder::new(source(), localized_columns())
                .filter(filter)
                .build()
                .unwrap_err(),
            PlannerError::MisplacedAggregate { .. }
        ));
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(matches!(
            QueryPlanBuilder::new(source(), localized_columns())
                .window(Window::new(0, Some(0)))
                .build()
                .unwrap_err(),
            PlannerError::InvalidWindow(_)
        ));
    }

    #[test]
    fn test_with_window() {
        let plan = QueryPlanBuilder::new(source(), localized_columns())
            .build()
            .unwrap();
        assert!(matches!(
            plan.with_window(Window::new(5, Some(5))),
            Err(PlannerError::OrderingRequiredForPagination { offset: 5 })
        ));
        assert_eq!(
            plan.with_window(Window::new(0, Some(5))).unwrap().window(),
            Window::new(0, Some(5))
        );
    }

    #[test]
    fn test_build_fn() {
        let plan = build(
            source(),
            Projections::distinct(localized_columns()),
            Some(Restrictions::is_not_null(Projections::property("e", "Id"))),
            [OrderDirective::alias("LocalizedName")],
            Window::new(10, Some(20)),
        )
        .unwrap();
        assert!(plan.filter().is_some());
        assert_eq!(plan.columns()[1].name, "LocalizedName");
    }
}
