//! Modification-time-keyed cache of loaded plugin units.
//!
//! The key is (location, mtime-at-call-time): when a plugin file changes on
//! disk its old entries simply become unreachable and the next lookup loads
//! a fresh generation. Old generations are intentionally never evicted —
//! cardinality is one entry per file save — so hit paths stay lock-free;
//! [`UnitCache::clear`] is the manual bound for operators.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use dashmap::DashMap;
use tracing::debug;

use hookbridge_core::{AppError, AppResult};

use crate::loader::LoadedUnit;
use crate::traits::UnitLoader;

type CacheKey = (PathBuf, SystemTime);

/// Shared cache of loaded plugin units.
///
/// Concurrent lookups of different keys never block each other. Two workers
/// racing on the same missing key may both load; the last insert wins, which
/// is wasteful but not incorrect since both generations came from the same
/// file contents.
#[derive(Debug, Default)]
pub struct UnitCache {
    entries: DashMap<CacheKey, Arc<LoadedUnit>>,
}

impl UnitCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Return the cached unit for the file's current generation, loading it
    /// on a miss.
    ///
    /// Load failures are propagated and never cached; a subsequent call
    /// retries the load.
    pub fn get_or_load(&self, loader: &dyn UnitLoader, path: &Path) -> AppResult<Arc<LoadedUnit>> {
        let mtime = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| {
                AppError::load(format!("Failed to stat plugin '{}': {}", path.display(), e))
            })?;
        let key = (path.to_path_buf(), mtime);

        if let Some(unit) = self.entries.get(&key) {
            debug!(path = %path.display(), "Plugin cache hit");
            return Ok(Arc::clone(&unit));
        }

        let unit = loader.load(path)?;
        self.entries.insert(key, Arc::clone(&unit));
        debug!(path = %path.display(), "Plugin cached");
        Ok(unit)
    }

    /// Number of cached generations (across all files).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all cached generations.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
