//! Query session
//!
//! A `Session` pairs an execution backend with engine configuration and
//! hands out `QueryOver` builders:
//!
//! ```ignore
//! let page = session
//!     .query_over("Entity", "e")
//!     .select(Projections::distinct(list))
//!     .order_by(OrderDirective::alias("LocalizedName"))
//!     .skip(10)
//!     .take(20)
//!     .transform_using(AliasToBean::<LocalizedEntity>::new())
//!     .list()
//!     .await?;
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::QueryBackend;
use crate::config::{EngineConfig, FailureMode};
use crate::error::QueryResult;
use crate::executor::{collect_rows, paginate, ResultRow};
use crate::planner::{
    EntitySource, ExplainOutput, OutputColumn, QueryPlan, QueryPlanBuilder, Window,
};
use crate::projection::{OrderDirective, Predicate, ProjectionList, Selection};
use crate::transform::{ResultTransformer, ToList, TransformResult};

/// Query session over one backend
#[derive(Clone)]
pub struct Session {
    backend: Arc<dyn QueryBackend>,
    config: EngineConfig,
}

impl Session {
    /// Create a session executing against `backend`
    pub fn new(backend: Arc<dyn QueryBackend>, config: EngineConfig) -> Self {
        Self { backend, config }
    }

    /// Engine configuration applied to every query
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a query over `entity`, referenced as `alias` in projections
    pub fn query_over(&self, entity: &str, alias: &str) -> QueryOver<'_, ToList> {
        QueryOver {
            session: self,
            source: EntitySource::new(entity, alias),
            selection: None,
            filter: Vec::new(),
            order_by: Vec::new(),
            offset: 0,
            limit: None,
            transformer: ToList,
        }
    }
}

/// Fluent query builder bound to a session
pub struct QueryOver<'s, R> {
    session: &'s Session,
    source: EntitySource,
    selection: Option<Selection>,
    filter: Vec<Predicate>,
    order_by: Vec<OrderDirective>,
    offset: u64,
    limit: Option<u64>,
    transformer: R,
}

impl<'s, R: ResultTransformer> QueryOver<'s, R> {
    /// Set the projection list (plain or distinct)
    #[must_use]
    pub fn select(mut self, selection: impl Into<Selection>) -> Self {
        self.selection = Some(selection.into());
        self
    }

    /// Add a filter; repeated calls are ANDed
    #[must_use]
    pub fn where_(mut self, predicate: Predicate) -> Self {
        self.filter.push(predicate);
        self
    }

    /// Append an ORDER BY directive; earlier directives sort first
    #[must_use]
    pub fn order_by(mut self, directive: OrderDirective) -> Self {
        self.order_by.push(directive);
        self
    }

    /// Rows to skip before the first returned row
    #[must_use]
    pub fn skip(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Maximum rows to return
    #[must_use]
    pub fn take(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Replace the result transformer
    pub fn transform_using<T: ResultTransformer>(self, transformer: T) -> QueryOver<'s, T> {
        QueryOver {
            session: self.session,
            source: self.source,
            selection: self.selection,
            filter: self.filter,
            order_by: self.order_by,
            offset: self.offset,
            limit: self.limit,
            transformer,
        }
    }

    fn window(&self) -> Window {
        let (limit, clamped) = self.session.config.clamp_limit(self.limit);
        if clamped {
            warn!(
                requested = ?self.limit,
                max_page_size = ?self.session.config.max_page_size,
                "page size clamped"
            );
        }
        Window::new(self.offset, limit)
    }

    /// Build and validate the plan without executing it
    pub fn plan(&self) -> QueryResult<QueryPlan> {
        let selection = self
            .selection
            .clone()
            .unwrap_or_else(|| Selection::from(ProjectionList::new()));
        let mut builder =
            QueryPlanBuilder::new(self.source.clone(), selection).window(self.window());
        for predicate in &self.filter {
            builder = builder.filter(predicate.clone());
        }
        for directive in &self.order_by {
            builder = builder.order_by(directive.clone());
        }
        Ok(builder.build()?)
    }

    /// Operator tree the plan would run as
    pub fn explain(&self) -> QueryResult<String> {
        Ok(ExplainOutput::format(&self.plan()?))
    }

    /// Execute and return raw rows, aligned with the projection list
    pub async fn list_rows(&self) -> QueryResult<Vec<ResultRow>> {
        Ok(self.execute().await?.0)
    }

    /// Execute and transform every row, keeping per-row failures
    pub async fn list_partial(&self) -> QueryResult<Vec<TransformResult<R::Output>>> {
        let (rows, columns) = self.execute().await?;
        Ok(rows
            .iter()
            .map(|row| self.transformer.transform_row(row, &columns))
            .collect())
    }

    /// Execute and transform every row
    ///
    /// Rows that fail to transform are skipped and logged, or abort the
    /// listing when the session is configured to fail fast.
    pub async fn list(&self) -> QueryResult<Vec<R::Output>> {
        let (rows, columns) = self.execute().await?;
        let fail_fast = self.session.config.transform_failure == FailureMode::FailFast;

        let mut out = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            match self.transformer.transform_row(row, &columns) {
                Ok(value) => out.push(value),
                Err(e) if fail_fast => return Err(e.into()),
                Err(e) => warn!(row = index, error = %e, "row skipped: transform failed"),
            }
        }
        Ok(out)
    }

    async fn execute(&self) -> QueryResult<(Vec<ResultRow>, Vec<OutputColumn>)> {
        let backend = &self.session.backend;
        let plan = self.plan()?;
        let window = plan.window();
        let columns = plan.columns().to_vec();

        let compiled = plan.compile(backend.renderer())?;
        let mut rows = backend.execute(&compiled, &self.session.config).await?;
        if !backend.pages_server_side() {
            rows = paginate(rows, window);
        }

        let rows = collect_rows(rows.as_mut()).await?;
        debug!(
            entity = %self.source.entity,
            window = %window,
            rows = rows.len(),
            "query listed"
        );
        Ok((rows, columns))
    }
}
