//! Expression evaluation
//!
//! Projection expressions are bound to row positions once, when the
//! executor tree is built, and evaluated per row afterwards.

use crate::catalog::{DataType, EntityDef};
use crate::planner::SortKey;
use crate::projection::{CompareOp, Predicate, ProjectionExpr, ScalarFunction};

use super::datum::Datum;
use super::error::{ExecutorError, ExecutorResult};
use super::row::Row;

/// Scalar expression bound to row positions
#[derive(Debug, Clone, PartialEq)]
pub enum BoundExpr {
    Column(usize),
    Literal(Datum),
    Function {
        func: ScalarFunction,
        args: Vec<BoundExpr>,
    },
}

impl BoundExpr {
    /// Bind property references against an entity's storage layout
    pub fn bind(expr: &ProjectionExpr, entity: &EntityDef) -> ExecutorResult<Self> {
        match expr {
            ProjectionExpr::Column(col) => entity
                .get_property_index(&col.property)
                .map(BoundExpr::Column)
                .ok_or_else(|| ExecutorError::PropertyNotFound {
                    entity: entity.name.clone(),
                    property: col.property.clone(),
                }),
            ProjectionExpr::Literal(lit) => Ok(BoundExpr::Literal(Datum::from_literal(lit))),
            ProjectionExpr::Function { name, args, .. } => {
                let func = ScalarFunction::lookup(name).ok_or_else(|| {
                    ExecutorError::Internal(format!("unvalidated function '{}'", name))
                })?;
                let args = args
                    .iter()
                    .map(|a| Self::bind(a, entity))
                    .collect::<ExecutorResult<Vec<_>>>()?;
                Ok(BoundExpr::Function { func, args })
            }
            ProjectionExpr::Aggregate { .. } => Err(ExecutorError::Internal(format!(
                "aggregate '{}' outside an aggregate operator",
                expr
            ))),
        }
    }

    /// Bind a sort key; output columns are already positions
    pub fn from_sort_key(key: &SortKey) -> Self {
        match key {
            SortKey::Output(i) => BoundExpr::Column(*i),
            SortKey::Literal(lit) => BoundExpr::Literal(Datum::from_literal(lit)),
            SortKey::Function { func, args } => BoundExpr::Function {
                func: *func,
                args: args.iter().map(Self::from_sort_key).collect(),
            },
        }
    }
}

/// Evaluate a bound expression against a row
pub fn eval(expr: &BoundExpr, row: &Row) -> ExecutorResult<Datum> {
    match expr {
        BoundExpr::Column(index) => Ok(row.get(*index)?.clone()),
        BoundExpr::Literal(datum) => Ok(datum.clone()),
        BoundExpr::Function { func, args } => {
            let values = args
                .iter()
                .map(|a| eval(a, row))
                .collect::<ExecutorResult<Vec<_>>>()?;
            eval_function(*func, values)
        }
    }
}

fn text_arg(func: ScalarFunction, value: &Datum) -> ExecutorResult<Option<String>> {
    match value {
        Datum::Null => Ok(None),
        Datum::String(s) => Ok(Some(s.clone())),
        other => Err(ExecutorError::TypeMismatch {
            expected: DataType::Text,
            got: format!("{:?}", other),
            context: func.name().to_string(),
        }),
    }
}

/// Evaluate a scalar function over already evaluated arguments
pub fn eval_function(func: ScalarFunction, mut args: Vec<Datum>) -> ExecutorResult<Datum> {
    if !func.arity().accepts(args.len()) {
        return Err(ExecutorError::Internal(format!(
            "{} called with {} arguments",
            func.name(),
            args.len()
        )));
    }

    let result = match func {
        ScalarFunction::Coalesce => args
            .into_iter()
            .find(|d| !d.is_null())
            .unwrap_or(Datum::Null),
        ScalarFunction::NullIf => {
            let second = args.pop().unwrap_or_default();
            let first = args.pop().unwrap_or_default();
            if !first.is_null() && first == second {
                Datum::Null
            } else {
                first
            }
        }
        ScalarFunction::Upper => text_arg(func, &args[0])?
            .map(|s| Datum::String(s.to_uppercase()))
            .unwrap_or(Datum::Null),
        ScalarFunction::Lower => text_arg(func, &args[0])?
            .map(|s| Datum::String(s.to_lowercase()))
            .unwrap_or(Datum::Null),
        ScalarFunction::Trim => text_arg(func, &args[0])?
            .map(|s| Datum::String(s.trim().to_string()))
            .unwrap_or(Datum::Null),
        ScalarFunction::Length => text_arg(func, &args[0])?
            .map(|s| Datum::Int(s.chars().count() as i64))
            .unwrap_or(Datum::Null),
        ScalarFunction::Concat => {
            if args.iter().any(Datum::is_null) {
                Datum::Null
            } else {
                Datum::String(args.iter().map(ToString::to_string).collect())
            }
        }
        ScalarFunction::Abs => match &args[0] {
            Datum::Null => Datum::Null,
            Datum::Int(i) => Datum::Int(i.checked_abs().ok_or_else(|| {
                ExecutorError::InvalidOperation(format!("abs({}) overflows", i))
            })?),
            Datum::Float(f) => Datum::Float(f.abs()),
            other => {
                return Err(ExecutorError::TypeMismatch {
                    expected: DataType::Double,
                    got: format!("{:?}", other),
                    context: func.name().to_string(),
                })
            }
        },
    };
    Ok(result)
}

/// Predicate bound to row positions
#[derive(Debug, Clone, PartialEq)]
pub enum BoundPredicate {
    Compare {
        left: BoundExpr,
        op: CompareOp,
        right: BoundExpr,
    },
    Like {
        expr: BoundExpr,
        pattern: String,
    },
    IsNull {
        expr: BoundExpr,
        negated: bool,
    },
    InList {
        expr: BoundExpr,
        list: Vec<Datum>,
    },
    And(Vec<BoundPredicate>),
    Or(Vec<BoundPredicate>),
    Not(Box<BoundPredicate>),
}

impl BoundPredicate {
    pub fn bind(predicate: &Predicate, entity: &EntityDef) -> ExecutorResult<Self> {
        let bound = match predicate {
            Predicate::Compare { left, op, right } => BoundPredicate::Compare {
                left: BoundExpr::bind(left, entity)?,
                op: *op,
                right: BoundExpr::bind(right, entity)?,
            },
            Predicate::Like { expr, pattern } => BoundPredicate::Like {
                expr: BoundExpr::bind(expr, entity)?,
                pattern: pattern.clone(),
            },
            Predicate::IsNull { expr, negated } => BoundPredicate::IsNull {
                expr: BoundExpr::bind(expr, entity)?,
                negated: *negated,
            },
            Predicate::InList { expr, list } => BoundPredicate::InList {
                expr: BoundExpr::bind(expr, entity)?,
                list: list.iter().map(Datum::from_literal).collect(),
            },
            Predicate::And(items) => BoundPredicate::And(
                items
                    .iter()
                    .map(|p| Self::bind(p, entity))
                    .collect::<ExecutorResult<_>>()?,
            ),
            Predicate::Or(items) => BoundPredicate::Or(
                items
                    .iter()
                    .map(|p| Self::bind(p, entity))
                    .collect::<ExecutorResult<_>>()?,
            ),
            Predicate::Not(inner) => BoundPredicate::Not(Box::new(Self::bind(inner, entity)?)),
        };
        Ok(bound)
    }
}

/// Evaluate a predicate with SQL three-valued logic
///
/// Returns `Bool` or `Null` (unknown).
pub fn eval_predicate(predicate: &BoundPredicate, row: &Row) -> ExecutorResult<Datum> {
    let result = match predicate {
        BoundPredicate::Compare { left, op, right } => {
            let l = eval(left, row)?;
            let r = eval(right, row)?;
            if l.is_null() || r.is_null() {
                Datum::Null
            } else {
                let ord = l.cmp(&r);
                Datum::Bool(match op {
                    CompareOp::Eq => ord.is_eq(),
                    CompareOp::NotEq => ord.is_ne(),
                    CompareOp::Lt => ord.is_lt(),
                    CompareOp::LtEq => ord.is_le(),
                    CompareOp::Gt => ord.is_gt(),
                    CompareOp::GtEq => ord.is_ge(),
                })
            }
        }
        BoundPredicate::Like { expr, pattern } => eval(expr, row)?.like(pattern),
        BoundPredicate::IsNull { expr, negated } => {
            let is_null = eval(expr, row)?.is_null();
            Datum::Bool(is_null != *negated)
        }
        BoundPredicate::InList { expr, list } => {
            let value = eval(expr, row)?;
            if value.is_null() {
                Datum::Null
            } else if list.iter().any(|item| !item.is_null() && *item == value) {
                Datum::Bool(true)
            } else if list.iter().any(Datum::is_null) {
                Datum::Null
            } else {
                Datum::Bool(false)
            }
        }
        BoundPredicate::And(items) => {
            let mut unknown = false;
            for item in items {
                match eval_predicate(item, row)? {
                    Datum::Bool(false) => return Ok(Datum::Bool(false)),
                    Datum::Bool(true) => {}
                    _ => unknown = true,
                }
            }
            if unknown {
                Datum::Null
            } else {
                Datum::Bool(true)
            }
        }
        BoundPredicate::Or(items) => {
            let mut unknown = false;
            for item in items {
                match eval_predicate(item, row)? {
                    Datum::Bool(true) => return Ok(Datum::Bool(true)),
                    Datum::Bool(false) => {}
                    _ => unknown = true,
                }
            }
            if unknown {
                Datum::Null
            } else {
                Datum::Bool(false)
            }
        }
        BoundPredicate::Not(inner) => match eval_predicate(inner, row)? {
            Datum::Bool(b) => Datum::Bool(!b),
            _ => Datum::Null,
        },
    };
    Ok(result)
}
