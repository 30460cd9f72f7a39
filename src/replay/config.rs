//! Replay configuration

use crate::core::EngineConfig;
use std::time::Duration;
use tracing::warn;

/// Configuration for a replay run
///
/// Controls the worker pool size and the lock wait handed to the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayConfig {
    /// Runtime worker threads and maximum transfers in flight
    pub workers: usize,
    /// Lock wait bound for each transfer
    pub lock_timeout: Duration,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            lock_timeout: EngineConfig::default().lock_timeout,
        }
    }
}

impl ReplayConfig {
    /// Create a new ReplayConfig with custom values
    ///
    /// Zero values fall back to the defaults. The lock timeout is checked by
    /// [`EngineConfig::new`].
    pub fn new(workers: usize, lock_timeout: Duration) -> Self {
        let default = Self::default();

        let workers = if workers == 0 {
            warn!(default = default.workers, "Invalid workers (0), using default");
            default.workers
        } else {
            workers
        };

        Self {
            workers,
            lock_timeout: EngineConfig::new(lock_timeout).lock_timeout,
        }
    }

    /// Engine configuration derived from this replay configuration
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.lock_timeout)
    }
}
