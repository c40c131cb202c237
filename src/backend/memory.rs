//! In-memory backend
//!
//! Holds a catalog and the rows of each entity. Row storage is
//! copy-on-write: every query scans the snapshot current when it started.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::catalog::{Catalog, CatalogResult, DataType, EntityDef};
use crate::config::EngineConfig;
use crate::executor::{Datum, Executor, ExecutorEngine, ExecutorError, ExecutorResult, Row};
use crate::planner::{CompiledPlan, PlanRenderer, SqlTextRenderer};

use super::QueryBackend;

/// In-memory reference backend
#[derive(Default)]
pub struct MemoryBackend {
    catalog: RwLock<Catalog>,
    rows: RwLock<HashMap<String, Arc<Vec<Row>>>>,
    renderer: SqlTextRenderer,
    server_side_paging: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply windows inside the executor tree instead of leaving it to the
    /// caller
    #[must_use]
    pub fn with_server_side_paging(mut self, enabled: bool) -> Self {
        self.server_side_paging = enabled;
        self
    }

    /// Register an entity
    pub fn register(&self, entity: EntityDef) -> CatalogResult<()> {
        let name = entity.name.clone();
        self.catalog.write().create_entity(entity)?;
        self.rows.write().entry(name).or_default();
        Ok(())
    }

    /// Entity definition by name
    pub fn entity(&self, name: &str) -> Option<EntityDef> {
        self.catalog.read().get_entity(name).cloned()
    }

    /// Insert a row given as `(property, value)` pairs
    ///
    /// Properties left out are NULL.
    pub fn insert<'a>(
        &self,
        entity: &str,
        values: impl IntoIterator<Item = (&'a str, Datum)>,
    ) -> ExecutorResult<()> {
        let def = self
            .entity(entity)
            .ok_or_else(|| ExecutorError::EntityNotFound(entity.to_string()))?;

        let mut row = vec![Datum::Null; def.properties.len()];
        for (name, value) in values {
            let index =
                def.get_property_index(name)
                    .ok_or_else(|| ExecutorError::PropertyNotFound {
                        entity: entity.to_string(),
                        property: name.to_string(),
                    })?;
            row[index] = value;
        }

        for (prop, value) in def.properties.iter().zip(&row) {
            if value.is_null() {
                if !prop.nullable {
                    return Err(ExecutorError::InvalidOperation(format!(
                        "NULL in non-nullable property {}.{}",
                        entity, prop.name
                    )));
                }
                continue;
            }
            if !accepts(prop.data_type, value) {
                return Err(ExecutorError::TypeMismatch {
                    expected: prop.data_type,
                    got: value.data_type().map_or_else(String::new, |t| t.to_string()),
                    context: format!("insert into {}.{}", entity, prop.name),
                });
            }
        }

        let mut rows = self.rows.write();
        let stored = rows.entry(entity.to_string()).or_default();
        Arc::make_mut(stored).push(Row::new(row));
        trace!(entity, rows = stored.len(), "row inserted");
        Ok(())
    }

    /// Number of rows stored for an entity
    pub fn row_count(&self, entity: &str) -> usize {
        self.rows.read().get(entity).map_or(0, |r| r.len())
    }

    fn snapshot(&self, entity: &str) -> Arc<Vec<Row>> {
        self.rows
            .read()
            .get(entity)
            .map(Arc::clone)
            .unwrap_or_default()
    }
}

/// Whether a value may be stored in a property of type `ty`
fn accepts(ty: DataType, value: &Datum) -> bool {
    match (ty, value) {
        (DataType::Boolean, Datum::Bool(_)) => true,
        (DataType::Int, Datum::Int(i)) => i32::try_from(*i).is_ok(),
        (DataType::BigInt, Datum::Int(_)) => true,
        (DataType::Double, Datum::Float(_) | Datum::Int(_)) => true,
        (DataType::Text, Datum::String(_)) => true,
        (DataType::Uuid, Datum::Uuid(_)) => true,
        (DataType::Timestamp, Datum::Timestamp(_)) => true,
        _ => false,
    }
}

#[async_trait]
impl QueryBackend for MemoryBackend {
    fn renderer(&self) -> &dyn PlanRenderer {
        &self.renderer
    }

    async fn execute(
        &self,
        plan: &CompiledPlan,
        config: &EngineConfig,
    ) -> ExecutorResult<Box<dyn Executor>> {
        let entity_name = &plan.plan().source().entity;
        let entity = self
            .entity(entity_name)
            .ok_or_else(|| ExecutorError::EntityNotFound(entity_name.clone()))?;
        let rows = self.snapshot(entity_name);

        debug!(
            entity = %entity_name,
            rows = rows.len(),
            query = plan.rendered(),
            "executing plan"
        );

        ExecutorEngine::new(entity, rows)
            .null_ordering(config.null_ordering)
            .apply_window(self.server_side_paging)
            .build(plan.plan())
    }

    fn pages_server_side(&self) -> bool {
        self.server_side_paging
    }
}
