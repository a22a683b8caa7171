//! Plugin discovery configuration.

use serde::{Deserialize, Serialize};

/// Name of the environment variable holding extra plugin directories,
/// joined with the platform path separator.
pub const PLUGIN_PATH_ENV: &str = "HOOKBRIDGE_PLUGIN_PATH";

/// Plugin discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Built-in default directory containing plugin shared libraries.
    /// Always searched first.
    #[serde(default = "default_plugin_directory")]
    pub directory: String,
    /// Additional directories to search, in the order given. Merged after
    /// the default directory and any [`PLUGIN_PATH_ENV`] entries.
    #[serde(default)]
    pub extra_directories: Vec<String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: default_plugin_directory(),
            extra_directories: Vec::new(),
        }
    }
}

fn default_plugin_directory() -> String {
    "./plugins".to_string()
}
