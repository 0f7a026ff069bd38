//! Core Error Types
//!
//! Errors raised by the dependency-free types in this crate. The application
//! crate folds them into its own error enum.

use thiserror::Error;

/// Error raised when a shared setting is unusable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A required value is missing or out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Values are individually fine but inconsistent together
    #[error("Validation error: {0}")]
    Validation(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
