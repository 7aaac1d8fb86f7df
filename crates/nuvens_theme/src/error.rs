//! Theme error types

use thiserror::Error;

/// Errors returned by theme operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ThemeError {
    /// Theme name is not one of `light`, `dark`, `system`
    #[error("invalid theme: {0:?}")]
    InvalidTheme(String),

    /// Outline preset is not one of `normal`, `title`, `title-blur`
    #[error("invalid outline preset: {0:?}")]
    InvalidOutlinePreset(String),
}
