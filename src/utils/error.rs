//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions.

use interview_assist_core::CoreError;
use interview_assist_llm::LlmError;
use thiserror::Error;

use crate::services::validator::ResponseError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Provider call failures (including cancellation)
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// A structured LLM response did not match its expected shape
    #[error("{0}")]
    Response(#[from] ResponseError),

    /// A workflow step was requested without the state it depends on
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// The user aborted the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Every screenshot in a batch was missing or unreadable
    #[error("{0}")]
    NoValidScreenshots(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The batch-level error raised when no screenshot could be read
    pub fn no_valid_screenshots() -> Self {
        Self::NoValidScreenshots("Failed to load screenshot data".to_string())
    }

    /// Whether this error stems from a user-initiated abort
    pub fn is_cancelled(&self) -> bool {
        match self {
            AppError::Cancelled => true,
            AppError::Llm(e) => e.is_cancelled(),
            _ => false,
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(msg) => AppError::Config(msg),
            CoreError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Convert AppError to a string suitable for UI error events
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
