//! Process-wide execution statistics.
//!
//! Counters are per-field atomic: concurrent workers may interleave, but
//! totals end up correct. Engine-owned rather than ambient global state so
//! tests get isolated instances.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Atomic invocation counters, owned by the execution engine.
#[derive(Debug, Default)]
pub struct ExecutionStats {
    total: AtomicU64,
    successful: AtomicU64,
    failed: AtomicU64,
    total_micros: AtomicU64,
}

impl ExecutionStats {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one invocation outcome and its elapsed wall-clock time.
    pub fn record(&self, success: bool, elapsed: Duration) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.total_micros
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        if success {
            self.successful.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// A point-in-time copy of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total.load(Ordering::Relaxed),
            successful: self.successful.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            total_execution_time: self.total_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0,
        }
    }
}

/// A point-in-time view of the execution counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Total invocations, success or failure.
    pub total: u64,
    /// Successful invocations.
    pub successful: u64,
    /// Failed invocations.
    pub failed: u64,
    /// Cumulative execution time in seconds.
    pub total_execution_time: f64,
}

impl StatsSnapshot {
    /// Success rate as a percentage, zero when nothing has run.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64 * 100.0
        }
    }

    /// Mean execution time in seconds, zero when nothing has run.
    pub fn avg_execution_time(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.total_execution_time / self.total as f64
        }
    }
}
