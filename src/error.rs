//! Error types for the timer service
//!
//! The engine itself is total and never fails. Errors only come from the
//! boundary (input validation), the store's lock, and storage I/O.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to lock timer state: {0}")]
    LockPoisoned(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
