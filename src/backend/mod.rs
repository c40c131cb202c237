//! Execution backends
//!
//! A backend turns a compiled plan into a stream of result rows. Each row
//! carries one value per projection, in projection order; sort-only columns
//! never reach the caller.

pub mod memory;

pub use memory::MemoryBackend;

use async_trait::async_trait;

use crate::config::EngineConfig;
use crate::executor::{Executor, ExecutorResult};
use crate::planner::{CompiledPlan, PlanRenderer};

/// Abstract query execution interface
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Renderer used to compile plans for this backend
    fn renderer(&self) -> &dyn PlanRenderer;

    /// Start executing a plan
    ///
    /// The returned executor is unopened. Backend failures are reported as
    /// `ExecutorError::Backend` and passed through unchanged.
    async fn execute(
        &self,
        plan: &CompiledPlan,
        config: &EngineConfig,
    ) -> ExecutorResult<Box<dyn Executor>>;

    /// Whether the backend applies the plan's window itself
    ///
    /// When false the caller wraps the returned stream in a pagination
    /// executor.
    fn pages_server_side(&self) -> bool {
        false
    }
}
