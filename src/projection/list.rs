//! Projection lists and the `Projections` factory

use crate::catalog::DataType;

use super::expr::{AggregateKind, ColumnRef, Literal, ProjectionExpr};

/// A projection with an optional alias
#[derive(Debug, Clone, PartialEq)]
pub struct AliasedProjection {
    pub expr: ProjectionExpr,
    pub alias: Option<String>,
    /// Marks a GROUP BY key
    pub grouped: bool,
}

impl AliasedProjection {
    pub fn new(expr: ProjectionExpr) -> Self {
        Self {
            expr,
            alias: None,
            grouped: false,
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Alias if declared, otherwise the expression's default name
    pub fn output_name(&self, index: usize) -> String {
        self.alias
            .clone()
            .unwrap_or_else(|| self.expr.default_name(index))
    }
}

impl From<ProjectionExpr> for AliasedProjection {
    fn from(expr: ProjectionExpr) -> Self {
        AliasedProjection::new(expr)
    }
}

/// Ordered projection list; order defines output column order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectionList {
    items: Vec<AliasedProjection>,
}

impl ProjectionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a projection
    #[must_use]
    pub fn add(mut self, item: impl Into<AliasedProjection>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Append a projection under an alias
    #[must_use]
    pub fn add_as(self, expr: ProjectionExpr, alias: impl Into<String>) -> Self {
        self.add(expr.with_alias(alias))
    }

    pub fn items(&self) -> &[AliasedProjection] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of the projection declaring `alias`
    pub fn position_of_alias(&self, alias: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|p| p.alias.as_deref() == Some(alias))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AliasedProjection> {
        self.items.iter()
    }
}

impl FromIterator<AliasedProjection> for ProjectionList {
    fn from_iter<I: IntoIterator<Item = AliasedProjection>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ProjectionList {
    type Item = &'a AliasedProjection;
    type IntoIter = std::slice::Iter<'a, AliasedProjection>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A projection list whose full output tuple is the deduplication key
#[derive(Debug, Clone, PartialEq)]
pub struct DistinctSpec {
    list: ProjectionList,
}

impl DistinctSpec {
    pub fn new(list: ProjectionList) -> Self {
        Self { list }
    }

    pub fn list(&self) -> &ProjectionList {
        &self.list
    }

    pub fn into_list(self) -> ProjectionList {
        self.list
    }
}

/// What a query selects
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    List(ProjectionList),
    Distinct(DistinctSpec),
}

impl Selection {
    pub fn list(&self) -> &ProjectionList {
        match self {
            Selection::List(list) => list,
            Selection::Distinct(spec) => spec.list(),
        }
    }

    pub fn is_distinct(&self) -> bool {
        matches!(self, Selection::Distinct(_))
    }

    pub fn into_parts(self) -> (ProjectionList, bool) {
        match self {
            Selection::List(list) => (list, false),
            Selection::Distinct(spec) => (spec.into_list(), true),
        }
    }
}

impl From<ProjectionList> for Selection {
    fn from(list: ProjectionList) -> Self {
        Selection::List(list)
    }
}

impl From<DistinctSpec> for Selection {
    fn from(spec: DistinctSpec) -> Self {
        Selection::Distinct(spec)
    }
}

/// Factory for projection expressions
pub struct Projections;

impl Projections {
    /// Empty projection list
    pub fn list() -> ProjectionList {
        ProjectionList::new()
    }

    /// Wrap a list so its output tuples are deduplicated
    pub fn distinct(list: ProjectionList) -> DistinctSpec {
        DistinctSpec::new(list)
    }

    /// Entity property
    pub fn property(entity_alias: &str, property: &str) -> ProjectionExpr {
        ProjectionExpr::Column(ColumnRef::new(entity_alias, property))
    }

    /// Entity property used as a GROUP BY key
    pub fn group_property(entity_alias: &str, property: &str) -> AliasedProjection {
        AliasedProjection {
            expr: Self::property(entity_alias, property),
            alias: None,
            grouped: true,
        }
    }

    /// Scalar SQL function call
    pub fn sql_function(
        name: &str,
        result_type: DataType,
        args: impl IntoIterator<Item = ProjectionExpr>,
    ) -> ProjectionExpr {
        ProjectionExpr::Function {
            name: name.to_string(),
            args: args.into_iter().collect(),
            result_type,
        }
    }

    pub fn literal(value: impl Into<Literal>) -> ProjectionExpr {
        ProjectionExpr::Literal(value.into())
    }

    pub fn row_count() -> ProjectionExpr {
        ProjectionExpr::Aggregate {
            func: AggregateKind::RowCount,
            arg: None,
            distinct: false,
        }
    }

    pub fn count(expr: ProjectionExpr) -> ProjectionExpr {
        Self::aggregate(AggregateKind::Count, expr, false)
    }

    pub fn count_distinct(expr: ProjectionExpr) -> ProjectionExpr {
        Self::aggregate(AggregateKind::Count, expr, true)
    }

    pub fn sum(expr: ProjectionExpr) -> ProjectionExpr {
        Self::aggregate(AggregateKind::Sum, expr, false)
    }

    pub fn avg(expr: ProjectionExpr) -> ProjectionExpr {
        Self::aggregate(AggregateKind::Avg, expr, false)
    }

    pub fn min(expr: ProjectionExpr) -> ProjectionExpr {
        Self::aggregate(AggregateKind::Min, expr, false)
    }

    pub fn max(expr: ProjectionExpr) -> ProjectionExpr {
        Self::aggregate(AggregateKind::Max, expr, false)
    }

    fn aggregate(func: AggregateKind, expr: ProjectionExpr, distinct: bool) -> ProjectionExpr {
        ProjectionExpr::Aggregate {
            func,
            arg: Some(Box::new(expr)),
            distinct,
        }
    }
}
