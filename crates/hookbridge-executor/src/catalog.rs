//! Catalog operations backing the List / Describe / HealthCheck facade
//! operations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use hookbridge_core::AppResult;

use crate::engine::ExecutionEngine;

/// What the catalog reports about one discovered plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginEntry {
    /// Plugin name from discovery.
    pub name: String,
    /// Location of the plugin unit.
    pub path: PathBuf,
    /// One-line description; explains the failure when unavailable.
    pub description: String,
    /// Supported HTTP methods, uppercase.
    pub supported_methods: Vec<String>,
    /// Whether the unit loaded successfully.
    pub is_available: bool,
    /// RFC 3339 modification time, empty when unreadable.
    pub last_modified: String,
}

/// Service health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Everything works.
    Healthy,
    /// Serving, but plugin-level issues were detected.
    Degraded,
    /// The discovery map itself cannot be built.
    Unhealthy,
}

impl HealthStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// The health check outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Overall classification.
    pub status: HealthStatus,
    /// Explanatory message.
    pub message: String,
    /// Counters, rates, and cache size as display strings.
    pub details: BTreeMap<String, String>,
}

impl ExecutionEngine {
    /// List discovered plugins, sorted by name for determinism.
    ///
    /// Each plugin gets a cache load attempt to compute its capability set
    /// and description; load failures produce an unavailable entry rather
    /// than omitting the plugin. `filter` keeps names containing the
    /// substring, case-insensitively.
    pub fn list_plugins(&self, filter: Option<&str>) -> AppResult<Vec<PluginEntry>> {
        let plugins = self.discover()?;
        let total = plugins.len();

        // BTreeMap iteration is already name-sorted.
        let entries: Vec<PluginEntry> = plugins
            .iter()
            .filter(|(name, _)| match filter {
                Some(f) if !f.is_empty() => name.to_lowercase().contains(&f.to_lowercase()),
                _ => true,
            })
            .map(|(name, path)| self.entry_for(name, path))
            .collect();

        debug!(
            listed = entries.len(),
            total, "Plugin listing complete"
        );
        Ok(entries)
    }

    /// Describe one plugin by name; `None` when absent. No filter applies.
    pub fn plugin_info(&self, name: &str) -> AppResult<Option<PluginEntry>> {
        let plugins = self.discover()?;
        Ok(plugins.get(name).map(|path| self.entry_for(name, path)))
    }

    fn entry_for(&self, name: &str, path: &Path) -> PluginEntry {
        match self.cache.get_or_load(self.loader.as_ref(), path) {
            Ok(unit) => {
                let descriptor = unit.descriptor();
                PluginEntry {
                    name: name.to_string(),
                    path: path.to_path_buf(),
                    description: descriptor.description_or_default(),
                    supported_methods: descriptor
                        .overrides
                        .supported()
                        .iter()
                        .map(|m| m.as_str().to_string())
                        .collect(),
                    is_available: true,
                    last_modified: last_modified_rfc3339(path),
                }
            }
            Err(e) => {
                warn!(plugin = name, error = %e, "Failed to load plugin for listing");
                PluginEntry {
                    name: name.to_string(),
                    path: path.to_path_buf(),
                    description: format!("Failed to load: {e}"),
                    supported_methods: Vec::new(),
                    is_available: false,
                    last_modified: String::new(),
                }
            }
        }
    }

    /// Check service health.
    ///
    /// Unhealthy only when discovery itself fails. Degraded when no plugins
    /// are discovered, the canary load of one discovered plugin fails, or
    /// the success rate drops below 80% after more than ten executions.
    pub fn health(&self) -> HealthReport {
        let plugins = match self.discover() {
            Ok(plugins) => plugins,
            Err(e) => {
                let mut details = BTreeMap::new();
                details.insert("error".to_string(), e.to_string());
                return HealthReport {
                    status: HealthStatus::Unhealthy,
                    message: format!("Health check failed: {e}"),
                    details,
                };
            }
        };

        let snapshot = self.stats.snapshot();

        // Canary: try loading one discovered plugin.
        let canary = match plugins.values().next() {
            None => "unknown".to_string(),
            Some(path) => match self.cache.get_or_load(self.loader.as_ref(), path) {
                Ok(_) => "ok".to_string(),
                Err(e) => format!("failed: {e}"),
            },
        };

        let mut details = BTreeMap::new();
        details.insert("plugin_count".to_string(), plugins.len().to_string());
        details.insert("service".to_string(), "hookbridge-executor".to_string());
        details.insert("total_executions".to_string(), snapshot.total.to_string());
        details.insert(
            "successful_executions".to_string(),
            snapshot.successful.to_string(),
        );
        details.insert("failed_executions".to_string(), snapshot.failed.to_string());
        details.insert(
            "success_rate".to_string(),
            format!("{:.2}%", snapshot.success_rate()),
        );
        details.insert(
            "avg_execution_time".to_string(),
            format!("{:.3}s", snapshot.avg_execution_time()),
        );
        details.insert("plugin_test".to_string(), canary.clone());
        details.insert("cache_size".to_string(), self.cache.len().to_string());

        let (status, message) = if plugins.is_empty() {
            (HealthStatus::Degraded, "No plugins found".to_string())
        } else if canary.starts_with("failed") {
            (
                HealthStatus::Degraded,
                format!("Plugin loading issues detected: {canary}"),
            )
        } else if snapshot.total > 10 && snapshot.success_rate() < 80.0 {
            (
                HealthStatus::Degraded,
                format!("Low success rate: {:.1}%", snapshot.success_rate()),
            )
        } else {
            (
                HealthStatus::Healthy,
                format!(
                    "Executor is healthy. {} plugins available.",
                    plugins.len()
                ),
            )
        };

        HealthReport {
            status,
            message,
            details,
        }
    }
}

fn last_modified_rfc3339(path: &Path) -> String {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| DateTime::<Utc>::from(t).to_rfc3339())
        .unwrap_or_default()
}
