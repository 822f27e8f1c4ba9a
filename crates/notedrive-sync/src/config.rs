use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning for the sync coordinator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound on concurrent `resolve_url` calls during one refresh.
    pub max_concurrent_resolutions: usize,
    /// Per-resolution deadline; a slower call degrades that note only.
    pub resolve_timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent_resolutions: 8,
            resolve_timeout_ms: 10_000,
        }
    }
}

impl SyncConfig {
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    /// Concurrency actually used; zero is treated as one.
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_resolutions.max(1)
    }
}
