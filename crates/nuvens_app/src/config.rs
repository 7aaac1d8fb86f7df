//! Application configuration
//!
//! One TOML file with a section per subsystem. Every field has a default, so
//! an empty file (or no file at all) yields the stock configuration.
//!
//! ```toml
//! [theme]
//! transition_duration_ms = 200
//!
//! [clouds]
//! default_style = "dynamic"
//! seed = 7
//!
//! [logging]
//! filter = "nuvens=debug"
//! ```

use nuvens_animation::TransitionConfig;
use nuvens_bridge::BridgeConfig;
use nuvens_clouds::MotionConfig;
use nuvens_theme::ThemeConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default file name looked up in the state directory
pub const CONFIG_FILE: &str = "nuvens.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tracing and development log settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset
    pub filter: String,
    /// Entries kept by the development log
    pub devlog_capacity: usize,
    pub devlog_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "nuvens=info".to_string(),
            devlog_capacity: 100,
            devlog_enabled: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NuvensConfig {
    pub theme: ThemeConfig,
    pub transitions: TransitionConfig,
    pub clouds: MotionConfig,
    pub bridge: BridgeConfig,
    pub logging: LoggingConfig,
}

impl NuvensConfig {
    /// Read and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file means defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reject values the engines cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transitions.steps == 0 {
            return Err(ConfigError::Invalid("transitions.steps must be at least 1".into()));
        }
        if self.clouds.min_steps == 0 || self.clouds.min_steps > self.clouds.max_steps {
            return Err(ConfigError::Invalid(format!(
                "clouds.min_steps ({}) must be within 1..=max_steps ({})",
                self.clouds.min_steps, self.clouds.max_steps
            )));
        }
        let zone = &self.clouds.safe_zone;
        if zone.x[0] >= zone.x[1] || zone.y[0] >= zone.y[1] {
            return Err(ConfigError::Invalid("clouds.safe_zone bounds are inverted".into()));
        }
        if self.bridge.attempts == 0 {
            return Err(ConfigError::Invalid("bridge.attempts must be at least 1".into()));
        }
        Ok(())
    }
}
