//! Bridge errors

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by the interpreter itself
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ScriptError {
    pub message: String,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Why a single attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    TimedOut(Duration),
    Script(ScriptError),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::TimedOut(limit) => write!(f, "timed out after {limit:?}"),
            AttemptFailure::Script(e) => write!(f, "script error: {e}"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("runtime failed to load: {0}")]
    Load(ScriptError),

    #[error("execution failed after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: AttemptFailure },

    #[error("could not fetch script `{path}`: {source}")]
    Fetch { path: String, source: ScriptError },

    #[error("package install failed: {0}")]
    Install(ScriptError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
