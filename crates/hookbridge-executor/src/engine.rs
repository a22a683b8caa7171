//! The plugin execution engine.
//!
//! A single invocation moves through `Received → Resolving → {NotFound |
//! LoadFailed | Invoking} → {ExecutionFailed | Succeeded} → Reported`; every
//! failure state is terminal, converted to an envelope, and never retried.
//! No lock is held while a plugin capability runs.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use hookbridge_core::AppResult;
use hookbridge_core::config::plugin::PluginConfig;
use hookbridge_core::types::{ExecutionResult, HttpMethod, Payload, payload_to_wire};
use hookbridge_plugin::cache::UnitCache;
use hookbridge_plugin::discovery;
use hookbridge_plugin::loader::{DynamicLoader, LoadedUnit};
use hookbridge_plugin::traits::{Invocation, UnitLoader};

use crate::stats::ExecutionStats;

/// Resolves plugin names and executes capability invocations.
///
/// Owns all shared mutable state (unit cache, statistics) explicitly;
/// safe to call from any number of concurrent workers.
pub struct ExecutionEngine {
    pub(crate) plugins: PluginConfig,
    pub(crate) loader: Arc<dyn UnitLoader>,
    pub(crate) cache: UnitCache,
    pub(crate) stats: ExecutionStats,
}

impl ExecutionEngine {
    /// Create an engine with a custom unit loader.
    pub fn new(plugins: PluginConfig, loader: Arc<dyn UnitLoader>) -> Self {
        Self {
            plugins,
            loader,
            cache: UnitCache::new(),
            stats: ExecutionStats::new(),
        }
    }

    /// Create an engine backed by the shared-library loader.
    pub fn with_dynamic_loader(plugins: PluginConfig) -> Self {
        Self::new(plugins, Arc::new(DynamicLoader::new()))
    }

    /// Run one discovery pass and log what the engine can see. Called at
    /// service start.
    pub fn validate_environment(&self) -> AppResult<()> {
        let plugins = discovery::discover(&self.plugins)?;
        info!(
            plugin_count = plugins.len(),
            directories = ?discovery::plugin_search_paths(&self.plugins),
            "Environment validation passed"
        );
        Ok(())
    }

    /// The engine's execution statistics.
    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    /// The engine's unit cache.
    pub fn cache(&self) -> &UnitCache {
        &self.cache
    }

    pub(crate) fn discover(&self) -> AppResult<BTreeMap<String, PathBuf>> {
        discovery::discover(&self.plugins)
    }

    /// Execute a plugin by name.
    ///
    /// Never fails at the signature level: every error becomes a failure
    /// envelope, and every outcome is recorded in the statistics.
    pub async fn execute(
        &self,
        plugin_name: &str,
        payload: Payload,
        http_method: &str,
    ) -> ExecutionResult {
        let started = Instant::now();

        info!(plugin = plugin_name, method = http_method, "Executing plugin");
        debug!(plugin = plugin_name, payload = ?payload, "Request payload");

        let plugins = match self.discover() {
            Ok(plugins) => plugins,
            Err(e) => {
                error!(error = %e, "Plugin discovery failed");
                return self.report_failure(500, e.to_string(), started);
            }
        };

        let Some(path) = plugins.get(plugin_name) else {
            let available: Vec<&str> = plugins.keys().map(String::as_str).collect();
            let error = format!(
                "Plugin '{}' not found. Available plugins: [{}]",
                plugin_name,
                available.join(", ")
            );
            warn!(plugin = plugin_name, "Plugin not found");
            let elapsed = started.elapsed();
            self.stats.record(false, elapsed);
            return ExecutionResult::not_found(error, elapsed.as_secs_f64());
        };

        let unit = match self.cache.get_or_load(self.loader.as_ref(), path) {
            Ok(unit) => unit,
            Err(e) => {
                error!(plugin = plugin_name, error = %e, "Plugin load failed");
                return self.report_failure(500, e.to_string(), started);
            }
        };

        let invocation = Invocation::new(payload, http_method);
        match invoke_isolated(unit, invocation).await {
            Ok(result) => match payload_to_wire(&result) {
                Ok(data) => {
                    let elapsed = started.elapsed();
                    self.stats.record(true, elapsed);
                    info!(
                        plugin = plugin_name,
                        execution_time = elapsed.as_secs_f64(),
                        "Plugin executed successfully"
                    );
                    ExecutionResult::success(data, elapsed.as_secs_f64())
                }
                Err(e) => {
                    error!(plugin = plugin_name, error = %e, "Result normalization failed");
                    self.report_failure(500, e.to_string(), started)
                }
            },
            Err(message) => {
                let status = classify_status(&message);
                error!(plugin = plugin_name, status, error = %message, "Plugin execution failed");
                self.report_failure(status, message, started)
            }
        }
    }

    fn report_failure(
        &self,
        status_code: i32,
        error: String,
        started: Instant,
    ) -> ExecutionResult {
        let elapsed = started.elapsed();
        self.stats.record(false, elapsed);
        ExecutionResult::failure(status_code, error, elapsed.as_secs_f64())
    }
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("plugins", &self.plugins)
            .field("cache_size", &self.cache.len())
            .finish()
    }
}

/// Run a single-use handler on its own task so a panic inside plugin code
/// surfaces as an error envelope instead of tearing down the caller.
async fn invoke_isolated(unit: Arc<LoadedUnit>, invocation: Invocation) -> Result<Payload, String> {
    let task = tokio::task::spawn(async move {
        let overrides = unit.descriptor().overrides;
        let handler = unit.create_handler();
        match invocation.http_method() {
            Some(method) if overrides.contains(method) => match method {
                HttpMethod::Get => handler.get(&invocation).await,
                HttpMethod::Post => handler.post(&invocation).await,
                HttpMethod::Put => handler.put(&invocation).await,
                HttpMethod::Delete => handler.delete(&invocation).await,
            },
            _ => handler.handle(&invocation).await,
        }
    });

    match task.await {
        Ok(Ok(payload)) => Ok(payload),
        Ok(Err(e)) => Err(e.message),
        Err(join) if join.is_panic() => Err(format!(
            "Plugin panicked: {}",
            panic_message(join.into_panic())
        )),
        Err(join) => Err(format!("Plugin task failed: {join}")),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Map plugin error text to an HTTP-style status by keyword.
fn classify_status(message: &str) -> i32 {
    let lower = message.to_lowercase();
    if lower.contains("not found") {
        404
    } else if lower.contains("permission") || lower.contains("access") {
        403
    } else if lower.contains("timeout") {
        408
    } else {
        500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::testing::Fixture;

    #[test]
    fn test_classify_status_keywords() {
        assert_eq!(classify_status("resource not found"), 404);
        assert_eq!(classify_status("Permission denied"), 403);
        assert_eq!(classify_status("ACCESS violation"), 403);
        assert_eq!(classify_status("connection timeout"), 408);
        assert_eq!(classify_status("something else broke"), 500);
    }

    #[tokio::test]
    async fn test_execute_success_returns_200_envelope() {
        let fixture = Fixture::new();
        let mut payload = Payload::new();
        payload.insert("key".to_string(), json!("value"));

        let result = fixture.engine.execute("echo", payload, "POST").await;

        assert_eq!(result.status_code, 200);
        assert_eq!(result.message, "success");
        assert!(result.error.is_none());
        assert_eq!(result.data["handler"], "generic");
        assert_eq!(result.data["method"], "POST");
        assert!(result.execution_time >= 0.0);
    }

    #[tokio::test]
    async fn test_unknown_plugin_returns_404_listing_available_names() {
        let fixture = Fixture::new();

        let result = fixture
            .engine
            .execute("does-not-exist", Payload::new(), "GET")
            .await;

        assert_eq!(result.status_code, 404);
        assert_eq!(result.message, "Plugin not found");
        let error = result.error.unwrap();
        assert!(error.contains("does-not-exist"));
        // Every discovered name is enumerated.
        assert!(error.contains("echo"));
        assert!(error.contains("rest"));

        let snapshot = fixture.engine.stats().snapshot();
        assert_eq!(snapshot.failed, 1);
    }

    #[tokio::test]
    async fn test_not_found_records_the_reported_elapsed_time() {
        let fixture = Fixture::new();

        let result = fixture
            .engine
            .execute("does-not-exist", Payload::new(), "GET")
            .await;

        // The envelope and the statistics see the same measurement; the
        // recorded copy only loses sub-microsecond precision.
        let snapshot = fixture.engine.stats().snapshot();
        let diff = result.execution_time - snapshot.total_execution_time;
        assert!(diff >= 0.0);
        assert!(diff < 1e-6);
    }

    #[tokio::test]
    async fn test_load_failure_returns_500_and_records_failure() {
        let fixture = Fixture::new();

        let result = fixture.engine.execute("broken", Payload::new(), "GET").await;

        assert_eq!(result.status_code, 500);
        assert_eq!(result.message, "Plugin execution failed");
        assert!(result.error.unwrap().contains("broken"));
        assert_eq!(fixture.engine.stats().snapshot().failed, 1);
    }

    #[tokio::test]
    async fn test_handler_error_is_classified_by_message() {
        let fixture = Fixture::new();

        let result = fixture
            .engine
            .execute("forbidden", Payload::new(), "GET")
            .await;
        assert_eq!(result.status_code, 403);

        let result = fixture.engine.execute("slow", Payload::new(), "GET").await;
        assert_eq!(result.status_code, 408);
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_500_envelope() {
        let fixture = Fixture::new();

        let result = fixture
            .engine
            .execute("panicky", Payload::new(), "GET")
            .await;

        assert_eq!(result.status_code, 500);
        assert!(result.error.unwrap().contains("panicked"));
        assert_eq!(fixture.engine.stats().snapshot().failed, 1);

        // The engine keeps serving after a plugin panic.
        let result = fixture.engine.execute("echo", Payload::new(), "GET").await;
        assert_eq!(result.status_code, 200);
    }

    #[tokio::test]
    async fn test_put_without_override_routes_to_generic_handler() {
        let fixture = Fixture::new();

        // "rest" overrides only GET; PUT falls back to handle.
        let result = fixture.engine.execute("rest", Payload::new(), "PUT").await;
        assert_eq!(result.status_code, 200);
        assert_eq!(result.data["handler"], "generic");
    }

    #[tokio::test]
    async fn test_overridden_method_routes_to_specific_capability() {
        let fixture = Fixture::new();

        let result = fixture.engine.execute("rest", Payload::new(), "get").await;
        assert_eq!(result.status_code, 200);
        assert_eq!(result.data["handler"], "get");
    }

    #[tokio::test]
    async fn test_compound_result_values_are_serialized_to_text() {
        let fixture = Fixture::new();
        let mut payload = Payload::new();
        payload.insert("x".to_string(), json!(1));
        payload.insert("y".to_string(), json!([1, 2]));

        // The mirror plugin echoes its payload back verbatim.
        let result = fixture.engine.execute("mirror", payload, "POST").await;

        assert_eq!(result.status_code, 200);
        assert_eq!(result.data["x"], "1");
        assert_eq!(result.data["y"], "[1,2]");
        let back: serde_json::Value = serde_json::from_str(&result.data["y"]).unwrap();
        assert_eq!(back, json!([1, 2]));
    }

    #[tokio::test]
    async fn test_statistics_track_successes_and_failures() {
        let fixture = Fixture::new();

        for _ in 0..3 {
            fixture.engine.execute("echo", Payload::new(), "GET").await;
        }
        fixture
            .engine
            .execute("does-not-exist", Payload::new(), "GET")
            .await;
        fixture.engine.execute("broken", Payload::new(), "GET").await;

        let snapshot = fixture.engine.stats().snapshot();
        assert_eq!(snapshot.total, 5);
        assert_eq!(snapshot.successful, 3);
        assert_eq!(snapshot.failed, 2);
        assert!((snapshot.success_rate() - 60.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_repeat_execution_hits_the_cache() {
        let fixture = Fixture::new();

        fixture.engine.execute("echo", Payload::new(), "GET").await;
        fixture.engine.execute("echo", Payload::new(), "GET").await;

        assert_eq!(fixture.loader.load_count("echo"), 1);
        assert_eq!(fixture.engine.cache().len(), 1);
    }
}
