use std::sync::PoisonError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActiveWindowError {
    #[error("{0}")]
    Error(String),

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("imaging subsystem unavailable: {0}")]
    Imaging(String),

    #[error("platform error: {0}")]
    Platform(String),

    #[error("StdSyncPoisonError {0}")]
    StdSyncPoisonError(String),

    #[error("unsupported on this platform")]
    Unsupported,
}

impl ActiveWindowError {
    pub fn new<S: ToString>(err: S) -> Self {
        ActiveWindowError::Error(err.to_string())
    }

    pub fn platform<S: ToString>(err: S) -> Self {
        ActiveWindowError::Platform(err.to_string())
    }
}

pub type ActiveWindowResult<T> = Result<T, ActiveWindowError>;

impl<T> From<PoisonError<T>> for ActiveWindowError {
    fn from(value: PoisonError<T>) -> Self {
        ActiveWindowError::StdSyncPoisonError(value.to_string())
    }
}
