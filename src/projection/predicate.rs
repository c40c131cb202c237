//! Filter predicates
//!
//! The planner only checks that predicates reference the queried entity and
//! known functions; evaluation belongs to the backend.

use std::fmt;

use super::expr::{Literal, ProjectionExpr};

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        }
    }
}

/// Boolean filter over a row of the queried entity
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        left: ProjectionExpr,
        op: CompareOp,
        right: ProjectionExpr,
    },
    Like {
        expr: ProjectionExpr,
        pattern: String,
    },
    IsNull {
        expr: ProjectionExpr,
        negated: bool,
    },
    InList {
        expr: ProjectionExpr,
        list: Vec<Literal>,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Visit every expression in the predicate
    pub fn for_each_expr<'a>(&'a self, f: &mut impl FnMut(&'a ProjectionExpr)) {
        match self {
            Predicate::Compare { left, right, .. } => {
                f(left);
                f(right);
            }
            Predicate::Like { expr, .. }
            | Predicate::IsNull { expr, .. }
            | Predicate::InList { expr, .. } => f(expr),
            Predicate::And(items) | Predicate::Or(items) => {
                for item in items {
                    item.for_each_expr(f);
                }
            }
            Predicate::Not(inner) => inner.for_each_expr(f),
        }
    }

    #[must_use]
    pub fn and(self, other: Predicate) -> Predicate {
        match self {
            Predicate::And(mut items) => {
                items.push(other);
                Predicate::And(items)
            }
            first => Predicate::And(vec![first, other]),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[Predicate], sep: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{}", item)?;
            }
            f.write_str(")")
        }

        match self {
            Predicate::Compare { left, op, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            Predicate::Like { expr, pattern } => {
                write!(f, "{} LIKE {}", expr, Literal::String(pattern.clone()))
            }
            Predicate::IsNull { expr, negated } => {
                if *negated {
                    write!(f, "{} IS NOT NULL", expr)
                } else {
                    write!(f, "{} IS NULL", expr)
                }
            }
            Predicate::InList { expr, list } => {
                let items: Vec<_> = list.iter().map(ToString::to_string).collect();
                write!(f, "{} IN ({})", expr, items.join(", "))
            }
            Predicate::And(items) => join(f, items, " AND "),
            Predicate::Or(items) => join(f, items, " OR "),
            Predicate::Not(inner) => write!(f, "NOT ({})", inner),
        }
    }
}

/// Factory for predicates
pub struct Restrictions;

impl Restrictions {
    fn compare(left: ProjectionExpr, op: CompareOp, right: impl Into<Literal>) -> Predicate {
        Predicate::Compare {
            left,
            op,
            right: ProjectionExpr::Literal(right.into()),
        }
    }

    pub fn eq(expr: ProjectionExpr, value: impl Into<Literal>) -> Predicate {
        Self::compare(expr, CompareOp::Eq, value)
    }

    pub fn not_eq(expr: ProjectionExpr, value: impl Into<Literal>) -> Predicate {
        Self::compare(expr, CompareOp::NotEq, value)
    }

    pub fn lt(expr: ProjectionExpr, value: impl Into<Literal>) -> Predicate {
        Self::compare(expr, CompareOp::Lt, value)
    }

    pub fn le(expr: ProjectionExpr, value: impl Into<Literal>) -> Predicate {
        Self::compare(expr, CompareOp::LtEq, value)
    }

    pub fn gt(expr: ProjectionExpr, value: impl Into<Literal>) -> Predicate {
        Self::compare(expr, CompareOp::Gt, value)
    }

    pub fn ge(expr: ProjectionExpr, value: impl Into<Literal>) -> Predicate {
        Self::compare(expr, CompareOp::GtEq, value)
    }

    /// Compare two expressions
    pub fn eq_expr(left: ProjectionExpr, right: ProjectionExpr) -> Predicate {
        Predicate::Compare {
            left,
            op: CompareOp::Eq,
            right,
        }
    }

    pub fn like(expr: ProjectionExpr, pattern: impl Into<String>) -> Predicate {
        Predicate::Like {
            expr,
            pattern: pattern.into(),
        }
    }

    pub fn is_null(expr: ProjectionExpr) -> Predicate {
        Predicate::IsNull {
            expr,
            negated: false,
        }
    }

    pub fn is_not_null(expr: ProjectionExpr) -> Predicate {
        Predicate::IsNull {
            expr,
            negated: true,
        }
    }

    pub fn in_list<L: Into<Literal>>(
        expr: ProjectionExpr,
        values: impl IntoIterator<Item = L>,
    ) -> Predicate {
        Predicate::InList {
            expr,
            list: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn and(items: impl IntoIterator<Item = Predicate>) -> Predicate {
        Predicate::And(items.into_iter().collect())
    }

    pub fn or(items: impl IntoIterator<Item = Predicate>) -> Predicate {
        Predicate::Or(items.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Predicate) -> Predicate {
        Predicate::Not(Box::new(inner))
    }
}
