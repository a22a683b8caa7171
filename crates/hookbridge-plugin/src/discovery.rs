//! Plugin discovery — scans prioritized directories into a name → location
//! map.
//!
//! Priority order: the built-in default directory first, then directories
//! from the `HOOKBRIDGE_PLUGIN_PATH` environment variable (path-separator
//! joined), then configured extra directories, each in the order given.
//! Within that order the first directory containing a given plugin name
//! wins. The scan is pure: callers own any caching of the result.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use hookbridge_core::AppResult;
use hookbridge_core::config::plugin::{PLUGIN_PATH_ENV, PluginConfig};

/// All directories to search, in priority order.
pub fn plugin_search_paths(config: &PluginConfig) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(&config.directory)];

    if let Ok(env_paths) = std::env::var(PLUGIN_PATH_ENV) {
        paths.extend(std::env::split_paths(&env_paths));
    }

    paths.extend(config.extra_directories.iter().map(PathBuf::from));
    paths
}

/// Build the name → location map for the configured directories.
///
/// Directories that do not exist or are not directories are skipped with a
/// warning. No recursion into subdirectories.
pub fn discover(config: &PluginConfig) -> AppResult<BTreeMap<String, PathBuf>> {
    let mut plugins = BTreeMap::new();

    for dir in plugin_search_paths(config) {
        if !dir.is_dir() {
            warn!(path = %dir.display(), "Plugin directory missing or not a directory, skipping");
            continue;
        }

        for (name, path) in scan_directory(&dir) {
            // Earlier directories win for duplicate names.
            if !plugins.contains_key(&name) {
                debug!(name = %name, path = %path.display(), "Found plugin");
                plugins.insert(name, path);
            }
        }
    }

    debug!(count = plugins.len(), "Plugin discovery complete");
    Ok(plugins)
}

/// Scan a single directory for plugin units, sorted by file name so the
/// merge order is deterministic.
fn scan_directory(dir: &Path) -> Vec<(String, PathBuf)> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Failed to read plugin directory, skipping");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| plugin_name(&path).map(|name| (name, path)))
        .collect()
}

/// Derive a plugin name from a candidate file, or `None` if the file is not
/// a plugin unit.
///
/// Only files with the platform shared-library extension qualify. The name
/// is the file stem with any `lib` prefix stripped; underscore-prefixed
/// stems (build artifacts, private units) are excluded.
fn plugin_name(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(std::env::consts::DLL_EXTENSION) {
        return None;
    }

    let stem = path.file_stem()?.to_str()?;
    if stem.starts_with('_') {
        return None;
    }

    let name = stem.strip_prefix("lib").unwrap_or(stem);
    if name.is_empty() {
        return None;
    }

    Some(name.to_string())
}
