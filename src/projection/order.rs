//! ORDER BY directives

use std::fmt;

use super::expr::ProjectionExpr;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn is_ascending(&self) -> bool {
        matches!(self, Direction::Ascending)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_ascending() { "ASC" } else { "DESC" })
    }
}

/// What an ORDER BY item refers to
#[derive(Debug, Clone, PartialEq)]
pub enum OrderTarget {
    /// Alias declared in the projection list
    Alias(String),
    /// Expression over the queried entity
    Expr(ProjectionExpr),
}

impl fmt::Display for OrderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderTarget::Alias(alias) => f.write_str(alias),
            OrderTarget::Expr(expr) => write!(f, "{}", expr),
        }
    }
}

impl From<&str> for OrderTarget {
    fn from(alias: &str) -> Self {
        OrderTarget::Alias(alias.to_string())
    }
}

impl From<String> for OrderTarget {
    fn from(alias: String) -> Self {
        OrderTarget::Alias(alias)
    }
}

impl From<ProjectionExpr> for OrderTarget {
    fn from(expr: ProjectionExpr) -> Self {
        OrderTarget::Expr(expr)
    }
}

/// One ORDER BY item; a directive list is applied primary key first
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDirective {
    pub target: OrderTarget,
    pub direction: Direction,
}

impl OrderDirective {
    pub fn new(target: impl Into<OrderTarget>, direction: Direction) -> Self {
        Self {
            target: target.into(),
            direction,
        }
    }

    pub fn asc(target: impl Into<OrderTarget>) -> Self {
        Self::new(target, Direction::Ascending)
    }

    pub fn desc(target: impl Into<OrderTarget>) -> Self {
        Self::new(target, Direction::Descending)
    }

    /// Order by a projection alias, ascending
    pub fn alias(alias: impl Into<String>) -> Self {
        Self::asc(OrderTarget::Alias(alias.into()))
    }
}

impl fmt::Display for OrderDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.target, self.direction)
    }
}
