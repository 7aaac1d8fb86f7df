//! Theme configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Theme application settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Persistence key holding the user's choice
    pub storage_key: String,
    /// Duration of each color transition
    pub transition_duration_ms: u64,
    /// Interpolate colors; when false every change is applied instantly
    pub interpolate: bool,
    /// Property updates per batch. Every batch of one application is issued
    /// in the same synchronous call; batches only group the writes.
    pub batch_size: usize,
    /// Delay before the rehydration pass (one frame)
    pub rehydration_delay_ms: u64,
    /// Elements forced through layout after a theme change
    pub critical_selectors: Vec<String>,
}

impl ThemeConfig {
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_duration_ms)
    }

    pub fn rehydration_delay(&self) -> Duration {
        Duration::from_millis(self.rehydration_delay_ms)
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "theme".to_string(),
            transition_duration_ms: 300,
            interpolate: true,
            batch_size: 8,
            rehydration_delay_ms: 16,
            critical_selectors: [
                "body",
                "[class*=\"mdc-\"]",
                "[class*=\"theme-\"]",
                ".text-outlined",
                ".game-start-button",
                ".theme-toggle",
                ".welcome-content",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}
