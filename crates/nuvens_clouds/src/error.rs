//! Cloud motion errors

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CloudError {
    /// Element has no rendered height yet; retry after layout
    #[error("cloud `{0}` is not laid out yet")]
    NotLaidOut(String),

    #[error("no cloud registered as `{0}`")]
    UnknownCloud(String),

    #[error("unknown motion style `{0}`")]
    UnknownStyle(String),

    #[error("global speed must be within 0.01..=100, got {0}")]
    InvalidSpeed(f32),
}

pub type Result<T> = std::result::Result<T, CloudError>;
