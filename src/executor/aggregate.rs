//! Aggregate executor
//!
//! Implements grouped projections: group properties form the group key and
//! aggregate functions (row count, COUNT, SUM, AVG, MIN, MAX) fold each group.
//! Groups are emitted in the order their first row arrived.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tracing::trace;

use crate::catalog::DataType;
use crate::projection::AggregateKind;

use super::datum::Datum;
use super::error::{ExecutorError, ExecutorResult};
use super::eval::{eval, BoundExpr};
use super::row::Row;
use super::Executor;

/// Aggregate function bound to input positions
#[derive(Debug, Clone)]
pub struct AggregateCall {
    pub kind: AggregateKind,
    /// `None` counts rows
    pub arg: Option<BoundExpr>,
    pub distinct: bool,
}

/// One output column of a grouped projection
#[derive(Debug, Clone)]
pub enum AggregateSlot {
    /// Group property; part of the group key
    Group(BoundExpr),
    /// Constant, repeated on every group
    Constant(Datum),
    Aggregate(AggregateCall),
}

/// Running SUM; stays integral until a float arrives
#[derive(Debug, Clone, Copy)]
enum SumState {
    Empty,
    Int(i64),
    Float(f64),
}

impl SumState {
    fn add(self, value: &Datum) -> ExecutorResult<Self> {
        match (self, value) {
            (SumState::Empty, Datum::Int(v)) => Ok(SumState::Int(*v)),
            (SumState::Int(sum), Datum::Int(v)) => sum
                .checked_add(*v)
                .map(SumState::Int)
                .ok_or_else(|| {
                    ExecutorError::InvalidOperation("integer overflow in sum".into())
                }),
            (SumState::Empty, Datum::Float(v)) => Ok(SumState::Float(*v)),
            (SumState::Int(sum), Datum::Float(v)) => Ok(SumState::Float(sum as f64 + v)),
            (SumState::Float(sum), v) => match v.as_float() {
                Some(v) => Ok(SumState::Float(sum + v)),
                None => Err(not_numeric("sum", v)),
            },
            (_, v) => Err(not_numeric("sum", v)),
        }
    }

    fn finalize(self) -> Datum {
        match self {
            SumState::Empty => Datum::Null,
            SumState::Int(v) => Datum::Int(v),
            SumState::Float(v) => Datum::Float(v),
        }
    }
}

fn not_numeric(context: &str, value: &Datum) -> ExecutorError {
    ExecutorError::TypeMismatch {
        expected: DataType::Double,
        got: value.data_type().map_or_else(String::new, |t| t.to_string()),
        context: context.to_string(),
    }
}

#[derive(Debug, Clone)]
enum Fold {
    Count(i64),
    Sum(SumState),
    Avg { sum: f64, count: i64 },
    Min(Option<Datum>),
    Max(Option<Datum>),
}

/// Accumulator for a single aggregate function
#[derive(Debug, Clone)]
struct Accumulator {
    fold: Fold,
    counts_rows: bool,
    /// Values already folded, for DISTINCT aggregates
    seen: Option<HashSet<Datum>>,
}

impl Accumulator {
    fn new(call: &AggregateCall) -> Self {
        let fold = match call.kind {
            AggregateKind::Count | AggregateKind::RowCount => Fold::Count(0),
            AggregateKind::Sum => Fold::Sum(SumState::Empty),
            AggregateKind::Avg => Fold::Avg { sum: 0.0, count: 0 },
            AggregateKind::Min => Fold::Min(None),
            AggregateKind::Max => Fold::Max(None),
        };
        Accumulator {
            fold,
            counts_rows: call.kind == AggregateKind::RowCount || call.arg.is_none(),
            seen: call.distinct.then(HashSet::new),
        }
    }

    fn accumulate(&mut self, value: Datum) -> ExecutorResult<()> {
        if self.counts_rows {
            if let Fold::Count(n) = &mut self.fold {
                *n += 1;
            }
            return Ok(());
        }
        // Aggregates ignore NULL inputs
        if value.is_null() {
            return Ok(());
        }
        if let Some(seen) = &mut self.seen {
            if !seen.insert(value.clone()) {
                return Ok(());
            }
        }

        match &mut self.fold {
            Fold::Count(n) => *n += 1,
            Fold::Sum(sum) => *sum = sum.add(&value)?,
            Fold::Avg { sum, count } => {
                let v = value.as_float().ok_or_else(|| not_numeric("avg", &value))?;
                *sum += v;
                *count += 1;
            }
            Fold::Min(min) => match min {
                Some(m) if value >= *m => {}
                _ => *min = Some(value),
            },
            Fold::Max(max) => match max {
                Some(m) if value <= *m => {}
                _ => *max = Some(value),
            },
        }
        Ok(())
    }

    fn finalize(&self) -> Datum {
        match &self.fold {
            Fold::Count(n) => Datum::Int(*n),
            Fold::Sum(sum) => sum.finalize(),
            Fold::Avg { sum, count } => {
                if *count == 0 {
                    Datum::Null
                } else {
                    Datum::Float(*sum / *count as f64)
                }
            }
            Fold::Min(v) | Fold::Max(v) => v.clone().unwrap_or(Datum::Null),
        }
    }
}

/// Hash aggregate executor
pub struct HashAggregate {
    /// Input executor
    input: Box<dyn Executor>,
    slots: Vec<AggregateSlot>,
    /// Finished groups, in first-seen order
    output: Vec<Row>,
    /// Current position in output
    position: usize,
}

impl HashAggregate {
    /// Create an aggregate producing one output column per slot
    pub fn new(input: Box<dyn Executor>, slots: Vec<AggregateSlot>) -> Self {
        HashAggregate {
            input,
            slots,
            output: Vec::new(),
            position: 0,
        }
    }

    fn new_accumulators(&self) -> Vec<Accumulator> {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                AggregateSlot::Aggregate(call) => Some(Accumulator::new(call)),
                _ => None,
            })
            .collect()
    }

    fn has_group_keys(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| matches!(slot, AggregateSlot::Group(_)))
    }

    fn finish_group(&self, key: Vec<Datum>, accumulators: &[Accumulator]) -> Row {
        let mut key = key.into_iter();
        let mut accumulators = accumulators.iter();
        let values = self
            .slots
            .iter()
            .map(|slot| match slot {
                AggregateSlot::Group(_) => key.next().unwrap_or_default(),
                AggregateSlot::Constant(d) => d.clone(),
                AggregateSlot::Aggregate(_) => accumulators
                    .next()
                    .map(Accumulator::finalize)
                    .unwrap_or_default(),
            })
            .collect();
        Row::new(values)
    }
}

#[async_trait]
impl Executor for HashAggregate {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.output.clear();
        self.position = 0;

        self.input.open().await?;

        let mut index: HashMap<Vec<Datum>, usize> = HashMap::new();
        let mut groups: Vec<(Vec<Datum>, Vec<Accumulator>)> = Vec::new();
        let mut input_rows = 0usize;

        while let Some(row) = self.input.next().await? {
            input_rows += 1;

            let mut key = Vec::new();
            for slot in &self.slots {
                if let AggregateSlot::Group(expr) = slot {
                    key.push(eval(expr, &row)?);
                }
            }

            let group = match index.get(&key) {
                Some(&i) => i,
                None => {
                    groups.push((key.clone(), self.new_accumulators()));
                    index.insert(key, groups.len() - 1);
                    groups.len() - 1
                }
            };

            let accumulators = &mut groups[group].1;
            let calls = self.slots.iter().filter_map(|slot| match slot {
                AggregateSlot::Aggregate(call) => Some(call),
                _ => None,
            });
            for (acc, call) in accumulators.iter_mut().zip(calls) {
                let value = match &call.arg {
                    Some(arg) => eval(arg, &row)?,
                    None => Datum::Null,
                };
                acc.accumulate(value)?;
            }
        }

        self.input.close().await?;

        // Aggregating an empty input without group keys still yields one row
        if groups.is_empty() && !self.has_group_keys() {
            groups.push((Vec::new(), self.new_accumulators()));
        }

        trace!(input_rows, groups = groups.len(), "aggregation complete");

        self.output = groups
            .into_iter()
            .map(|(key, accs)| self.finish_group(key, &accs))
            .collect();
        Ok(())
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        let row = self.output.get(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        self.output.clear();
        Ok(())
    }
}
