//! The normalized execution result envelope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The uniform envelope returned by every plugin invocation, success or
/// failure. Mirrors the remote-procedure response shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// HTTP-style status code (200, 403, 404, 408, 500).
    pub status_code: i32,
    /// Short outcome message.
    pub message: String,
    /// Normalized string-only result data.
    pub data: BTreeMap<String, String>,
    /// Error text, present on failures.
    pub error: Option<String>,
    /// Wall-clock execution time in seconds.
    pub execution_time: f64,
}

impl ExecutionResult {
    /// A successful invocation.
    pub fn success(data: BTreeMap<String, String>, execution_time: f64) -> Self {
        Self {
            status_code: 200,
            message: "success".to_string(),
            data,
            error: None,
            execution_time,
        }
    }

    /// The plugin name was absent from the discovery map.
    pub fn not_found(error: impl Into<String>, execution_time: f64) -> Self {
        Self {
            status_code: 404,
            message: "Plugin not found".to_string(),
            data: BTreeMap::new(),
            error: Some(error.into()),
            execution_time,
        }
    }

    /// The plugin failed to load or its code raised an error.
    pub fn failure(status_code: i32, error: impl Into<String>, execution_time: f64) -> Self {
        Self {
            status_code,
            message: "Plugin execution failed".to_string(),
            data: BTreeMap::new(),
            error: Some(error.into()),
            execution_time,
        }
    }

    /// Whether this envelope reports a success.
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}
