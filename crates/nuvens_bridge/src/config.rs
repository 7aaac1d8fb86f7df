//! Bridge configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Limit for a single execution attempt
    pub execution_timeout_ms: u64,
    /// Attempts per execution, including the first
    pub attempts: u32,
    /// Backoff unit; the wait after attempt `n` is `n * backoff`
    pub backoff_ms: u64,
    pub cache_ttl_ms: u64,
    /// Executions kept in the history
    pub history_len: usize,
}

impl BridgeConfig {
    pub fn execution_timeout(&self) -> Duration {
        Duration::from_millis(self.execution_timeout_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            execution_timeout_ms: 30_000,
            attempts: 3,
            backoff_ms: 1_000,
            cache_ttl_ms: 5 * 60 * 1_000,
            history_len: 10,
        }
    }
}
