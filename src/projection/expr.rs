//! Projection expression tree
//!
//! These types describe *what* a query selects. They are immutable value
//! descriptors; the planner validates them and the executor binds them to
//! row positions.

use std::fmt;

use crate::catalog::DataType;

use super::list::AliasedProjection;

/// Reference to a property of the queried entity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Alias the entity was given in the query (`e` in `from Entity e`)
    pub entity_alias: String,
    /// Property name
    pub property: String,
}

impl ColumnRef {
    pub fn new(entity_alias: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            entity_alias: entity_alias.into(),
            property: property.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity_alias, self.property)
    }
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Literal {
    /// Type of the literal, `None` for NULL
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Literal::Null => None,
            Literal::Boolean(_) => Some(DataType::Boolean),
            Literal::Integer(_) => Some(DataType::BigInt),
            Literal::Float(_) => Some(DataType::Double),
            Literal::String(_) => Some(DataType::Text),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("NULL"),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Integer(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Integer(i64::from(v))
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Boolean(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::String(v)
    }
}

/// Aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    /// COUNT(expr) - non-null values
    Count,
    /// COUNT(*) - all rows
    RowCount,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateKind {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateKind::Count | AggregateKind::RowCount => "count",
            AggregateKind::Sum => "sum",
            AggregateKind::Avg => "avg",
            AggregateKind::Min => "min",
            AggregateKind::Max => "max",
        }
    }
}

/// A projected expression
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionExpr {
    /// Entity property
    Column(ColumnRef),
    /// Constant
    Literal(Literal),
    /// Scalar SQL function call; the name is resolved at plan build time
    Function {
        name: String,
        args: Vec<ProjectionExpr>,
        result_type: DataType,
    },
    /// Aggregate over the filtered input
    Aggregate {
        func: AggregateKind,
        /// `None` only for `RowCount`
        arg: Option<Box<ProjectionExpr>>,
        distinct: bool,
    },
}

impl ProjectionExpr {
    /// Attach an alias, producing a projection list item
    pub fn with_alias(self, alias: impl Into<String>) -> AliasedProjection {
        AliasedProjection::new(self).alias(alias)
    }

    /// True if this node is an aggregate
    pub fn is_aggregate(&self) -> bool {
        matches!(self, ProjectionExpr::Aggregate { .. })
    }

    /// True if an aggregate appears anywhere in the tree
    pub fn contains_aggregate(&self) -> bool {
        match self {
            ProjectionExpr::Aggregate { .. } => true,
            ProjectionExpr::Function { args, .. } => args.iter().any(Self::contains_aggregate),
            ProjectionExpr::Column(_) | ProjectionExpr::Literal(_) => false,
        }
    }

    /// Visit every column reference in the tree
    pub fn for_each_column<'a>(&'a self, f: &mut impl FnMut(&'a ColumnRef)) {
        match self {
            ProjectionExpr::Column(col) => f(col),
            ProjectionExpr::Literal(_) => {}
            ProjectionExpr::Function { args, .. } => {
                for arg in args {
                    arg.for_each_column(f);
                }
            }
            ProjectionExpr::Aggregate { arg, .. } => {
                if let Some(arg) = arg {
                    arg.for_each_column(f);
                }
            }
        }
    }

    /// Statically known result type
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            ProjectionExpr::Column(_) => None,
            ProjectionExpr::Literal(lit) => lit.data_type(),
            ProjectionExpr::Function { result_type, .. } => Some(*result_type),
            ProjectionExpr::Aggregate { func, arg, .. } => match func {
                AggregateKind::Count | AggregateKind::RowCount => Some(DataType::BigInt),
                AggregateKind::Avg => Some(DataType::Double),
                // Integer sums stay integral
                AggregateKind::Sum => arg.as_ref().and_then(|a| a.data_type()).map(|t| {
                    if t.is_integer() {
                        DataType::BigInt
                    } else {
                        DataType::Double
                    }
                }),
                AggregateKind::Min | AggregateKind::Max => {
                    arg.as_ref().and_then(|a| a.data_type())
                }
            },
        }
    }

    /// Default output column name when no alias is given
    pub fn default_name(&self, index: usize) -> String {
        match self {
            ProjectionExpr::Column(col) => col.property.clone(),
            ProjectionExpr::Function { name, .. } => name.to_lowercase(),
            ProjectionExpr::Aggregate { func, .. } => func.name().to_string(),
            ProjectionExpr::Literal(_) => format!("expr_{}", index),
        }
    }
}

impl fmt::Display for ProjectionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionExpr::Column(col) => write!(f, "{}", col),
            ProjectionExpr::Literal(lit) => write!(f, "{}", lit),
            ProjectionExpr::Function { name, args, .. } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            ProjectionExpr::Aggregate {
                func,
                arg,
                distinct,
            } => match arg {
                None => write!(f, "{}(*)", func.name()),
                Some(arg) if *distinct => write!(f, "{}(distinct {})", func.name(), arg),
                Some(arg) => write!(f, "{}({})", func.name(), arg),
            },
        }
    }
}

impl From<ColumnRef> for ProjectionExpr {
    fn from(col: ColumnRef) -> Self {
        ProjectionExpr::Column(col)
    }
}

impl From<Literal> for ProjectionExpr {
    fn from(lit: Literal) -> Self {
        ProjectionExpr::Literal(lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coalesce() -> ProjectionExpr {
        ProjectionExpr::Function {
            name: "coalesce".to_string(),
            args: vec![
                ColumnRef::new("e", "EnglishName").into(),
                ColumnRef::new("e", "GermanName").into(),
            ],
            result_type: DataType::Text,
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            coalesce().to_string(),
            "coalesce(e.EnglishName, e.GermanName)"
        );
        let count = ProjectionExpr::Aggregate {
            func: AggregateKind::RowCount,
            arg: None,
            distinct: false,
        };
        assert_eq!(count.to_string(), "count(*)");
        assert_eq!(Literal::from("it's").to_string(), "'it''s'");
    }

    #[test]
    fn test_columns_and_aggregates() {
        let mut props = Vec::new();
        let expr = coalesce();
        expr.for_each_column(&mut |c| props.push(c.property.as_str()));
        assert_eq!(props, vec!["EnglishName", "GermanName"]);
        assert!(!expr.contains_aggregate());

        let nested = ProjectionExpr::Function {
            name: "abs".to_string(),
            args: vec![ProjectionExpr::Aggregate {
                func: AggregateKind::Sum,
                arg: Some(Box::new(ColumnRef::new("e", "n").into())),
                distinct: false,
            }],
            result_type: DataType::Double,
        };
        assert!(nested.contains_aggregate());
        assert!(!nested.is_aggregate());
    }

    #[test]
    fn test_data_type() {
        assert_eq!(coalesce().data_type(), Some(DataType::Text));
        assert_eq!(
            ProjectionExpr::Column(ColumnRef::new("e", "Id")).data_type(),
            None
        );

        let sum = |arg: Literal| ProjectionExpr::Aggregate {
            func: AggregateKind::Sum,
            arg: Some(Box::new(arg.into())),
            distinct: false,
        };
        assert_eq!(sum(Literal::Integer(1)).data_type(), Some(DataType::BigInt));
        assert_eq!(sum(Literal::Float(1.5)).data_type(), Some(DataType::Double));
    }
}
