//! Nuvens Script Bridge
//!
//! Async front door to an embedded interpreter. The interpreter sits behind
//! [`ScriptRunner`]; the bridge adds lazy loading, a timeout per attempt,
//! bounded retry with linear backoff, a TTL script cache, and statistics.
//!
//! Every call returns a `Result`; nothing here panics on interpreter failure.

pub mod bridge;
pub mod cache;
pub mod config;
pub mod error;
pub mod runner;

pub use bridge::{Bridge, BridgeState, Execution, ExecutionStats};
pub use cache::ScriptCache;
pub use config::BridgeConfig;
pub use error::{AttemptFailure, BridgeError, ScriptError};
pub use runner::{ScriptRunner, ScriptSource};
