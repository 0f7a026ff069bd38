//! Solution Fallback Service
//!
//! One-level fallback execution for the solution orchestrator.

mod chain;

pub use chain::{
    run_with_fallback, FailureReason, FallbackAttempt, FallbackError, FallbackExecutionLog,
    FallbackResult,
};
