//! Nuvens Application Services
//!
//! Wires the engines together for a host:
//!
//! - [`AppContext`]: explicit construction of every service, one frame entry
//!   point with a fixed write order, and teardown
//! - [`NuvensConfig`]: the TOML configuration file
//! - [`init_tracing`]: global subscriber with the in-memory [`DevLog`]
//!
//! ```rust
//! use nuvens_app::{AppContext, NuvensConfig};
//! use nuvens_theme::{MemoryStorage, MemoryStyleSheet};
//! use std::time::Instant;
//!
//! let storage = Box::new(MemoryStorage::new());
//! let mut ctx = AppContext::bootstrap(NuvensConfig::default(), storage, false);
//! let mut sheet = MemoryStyleSheet::new();
//! ctx.frame(Instant::now(), &mut sheet);
//! assert!(sheet.has_class("theme-light"));
//! ```

pub mod config;
pub mod context;
pub mod devlog;
pub mod logging;

pub use config::{ConfigError, LoggingConfig, NuvensConfig, CONFIG_FILE};
pub use context::{AppContext, FrameReport};
pub use devlog::{DevLog, DevLogLayer, LogCategory, LogEntry, LogFilter, LogLevel, LogStats};
pub use logging::{devlog, init_tracing};
