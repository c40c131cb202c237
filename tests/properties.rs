//! Property tests for paging, distinct and transformation

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;

use quarry::backend::MemoryBackend;
use quarry::catalog::{DataType, EntityDef, PropertyDef};
use quarry::executor::{collect_rows, paginate, Datum, Executor, ExecutorResult, Row};
use quarry::planner::{OutputColumn, Window};
use quarry::projection::Projections;
use quarry::transform::{transform, FieldDef, TargetRecordType};
use quarry::{EngineConfig, Session};

/// Rows `0..total` from memory
struct Ints {
    total: i64,
    next: i64,
}

#[async_trait]
impl Executor for Ints {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.next = 0;
        Ok(())
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if self.next >= self.total {
            return Ok(None);
        }
        self.next += 1;
        Ok(Some(Row::new(vec![Datum::Int(self.next - 1)])))
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        Ok(())
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn page(total: i64, window: Window) -> Vec<i64> {
    runtime().block_on(async {
        let mut exec = paginate(Box::new(Ints { total, next: 0 }), window);
        collect_rows(exec.as_mut())
            .await
            .unwrap()
            .iter()
            .map(|r| r.values()[0].as_int().unwrap())
            .collect()
    })
}

fn arb_datum() -> impl Strategy<Value = Datum> {
    prop_oneof![
        Just(Datum::Null),
        any::<bool>().prop_map(Datum::Bool),
        any::<i64>().prop_map(Datum::Int),
        (-1e6f64..1e6).prop_map(Datum::Float),
        "[a-zA-Z ]{0,8}".prop_map(Datum::String),
    ]
}

proptest! {
    #[test]
    fn prop_page_never_exceeds_limit(total in 0i64..200, offset in 0u64..250, limit in 1u64..50) {
        let rows = page(total, Window::new(offset, Some(limit)));
        prop_assert!(rows.len() as u64 <= limit);

        let start = (offset as i64).min(total);
        let end = (offset.saturating_add(limit) as i64).min(total);
        prop_assert_eq!(rows, (start..end).collect::<Vec<_>>());
    }

    #[test]
    fn prop_consecutive_pages_disjoint_and_contiguous(total in 0i64..120, offset in 0u64..60, limit in 1u64..30) {
        let first = page(total, Window::new(offset, Some(limit)));
        let second = page(total, Window::new(offset + limit, Some(limit)));

        let a: HashSet<_> = first.iter().collect();
        prop_assert!(second.iter().all(|r| !a.contains(r)));
        if let (Some(last), Some(next)) = (first.last(), second.first()) {
            prop_assert_eq!(*last + 1, *next);
        }

        let both = page(total, Window::new(offset, Some(2 * limit)));
        prop_assert_eq!([first, second].concat(), both);
    }

    #[test]
    fn prop_distinct_rows_unique(pairs in prop::collection::vec((0i64..4, prop::option::of(0i64..3)), 0..40)) {
        let backend = MemoryBackend::new();
        backend
            .register(
                EntityDef::new("Pair")
                    .property(PropertyDef::new("A", DataType::BigInt))
                    .property(PropertyDef::new("B", DataType::BigInt)),
            )
            .unwrap();
        for (a, b) in &pairs {
            backend
                .insert("Pair", [("A", Datum::Int(*a)), ("B", Datum::from(*b))])
                .unwrap();
        }
        let session = Session::new(Arc::new(backend), EngineConfig::default());

        let rows = runtime().block_on(
            session
                .query_over("Pair", "p")
                .select(Projections::distinct(
                    Projections::list()
                        .add(Projections::property("p", "A"))
                        .add(Projections::property("p", "B")),
                ))
                .list_rows(),
        ).unwrap();

        let unique: HashSet<_> = rows.iter().cloned().collect();
        prop_assert_eq!(unique.len(), rows.len());

        let expected: HashSet<_> = pairs
            .iter()
            .map(|(a, b)| Row::new(vec![Datum::Int(*a), Datum::from(*b)]))
            .collect();
        prop_assert_eq!(unique, expected);
    }

    #[test]
    fn prop_transform_idempotent(values in prop::collection::vec(arb_datum(), 1..6), aliased in any::<bool>()) {
        let mut target = TargetRecordType::new("Any");
        let mut columns = Vec::new();
        for (i, value) in values.iter().enumerate() {
            let name = format!("f{}", i);
            let ty = value.data_type().unwrap_or(DataType::Text);
            target = target.field(FieldDef::new(name.clone(), ty));
            columns.push(OutputColumn {
                index: i,
                name: name.clone(),
                alias: aliased.then_some(name),
                data_type: Some(ty),
                hidden: false,
            });
        }
        let target = Arc::new(target);
        let row = Row::new(values);

        let first = transform(&row, &columns, &target);
        let second = transform(&row, &columns, &target);
        prop_assert!(first.is_ok());
        prop_assert_eq!(first, second);
    }
}
