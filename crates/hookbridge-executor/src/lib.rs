//! # hookbridge-executor
//!
//! The execution engine of Hookbridge: resolves plugin names through
//! discovery and the unit cache, dispatches invocations to the right
//! capability, normalizes results and errors into uniform envelopes, and
//! keeps process-wide execution statistics. The catalog module backs the
//! List / Describe / HealthCheck facade operations.

pub mod catalog;
pub mod engine;
pub mod stats;

pub use catalog::{HealthReport, HealthStatus, PluginEntry};
pub use engine::ExecutionEngine;
pub use stats::{ExecutionStats, StatsSnapshot};

#[cfg(test)]
pub(crate) mod testing;
