//! Quarry - query projection and paging engine
//!
//! Features:
//! - Projection trees with SQL functions, aggregates and aliases
//! - ORDER BY resolution against projection aliases, DISTINCT-aware
//! - Deterministic offset/limit paging over lazy row streams
//! - Result transformation into typed records

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod fixtures;
pub mod planner;
pub mod projection;
pub mod session;
pub mod transform;

pub use config::EngineConfig;
pub use error::{QueryError, QueryResult};
pub use session::{QueryOver, Session};
