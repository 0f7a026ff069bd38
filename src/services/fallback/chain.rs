//! Solution Fallback Chain
//!
//! Runs a primary stage and, when it fails for a reason that allows it,
//! exactly one fallback stage. Every attempt is recorded in a
//! [`FallbackExecutionLog`] returned alongside the outcome.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use interview_assist_llm::LlmError;

use crate::utils::error::AppError;

/// Reasons a stage can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Provider is not available/configured
    Unavailable,
    /// Call timed out
    Timeout,
    /// Anything not covered below
    Error,
    /// Rate limited
    RateLimited,
    /// Network/connection error
    NetworkError,
    /// Response did not have the requested shape
    InvalidResponse,
    /// User cancelled
    Cancelled,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Unavailable => write!(f, "unavailable"),
            FailureReason::Timeout => write!(f, "timeout"),
            FailureReason::Error => write!(f, "error"),
            FailureReason::RateLimited => write!(f, "rate_limited"),
            FailureReason::NetworkError => write!(f, "network_error"),
            FailureReason::InvalidResponse => write!(f, "invalid_response"),
            FailureReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FailureReason {
    /// Check if this failure reason should trigger a fallback
    pub fn should_fallback(&self) -> bool {
        !matches!(self, FailureReason::Cancelled)
    }

    /// Classify an application error
    pub fn classify(error: &AppError) -> Self {
        match error {
            AppError::Cancelled => FailureReason::Cancelled,
            AppError::Llm(llm) => Self::from_llm_error(llm),
            AppError::Response(_) | AppError::Serialization(_) => {
                FailureReason::InvalidResponse
            }
            AppError::Config(_) => FailureReason::Unavailable,
            _ => FailureReason::Error,
        }
    }

    fn from_llm_error(error: &LlmError) -> Self {
        match error {
            LlmError::Cancelled => FailureReason::Cancelled,
            LlmError::RateLimited { .. } => FailureReason::RateLimited,
            LlmError::NetworkError { message } => {
                let lower = message.to_lowercase();
                if lower.contains("timeout") || lower.contains("timed out") {
                    FailureReason::Timeout
                } else {
                    FailureReason::NetworkError
                }
            }
            LlmError::ParseError { .. } => FailureReason::InvalidResponse,
            LlmError::AuthenticationFailed { .. }
            | LlmError::ProviderUnavailable { .. }
            | LlmError::ModelNotFound { .. } => FailureReason::Unavailable,
            _ => FailureReason::Error,
        }
    }
}

/// Record of a single stage attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackAttempt {
    /// Stage that was tried
    pub stage: String,
    /// Whether this attempt succeeded
    pub success: bool,
    /// Failure reason if failed
    pub failure_reason: Option<FailureReason>,
    /// Error message if failed
    pub error_message: Option<String>,
    /// Duration of the attempt in milliseconds
    pub duration_ms: u64,
    /// Timestamp when attempt started
    pub started_at: String,
}

impl FallbackAttempt {
    /// Create a successful attempt record
    pub fn success(stage: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            stage: stage.into(),
            success: true,
            failure_reason: None,
            error_message: None,
            duration_ms,
            started_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a failed attempt record
    pub fn failure(
        stage: impl Into<String>,
        reason: FailureReason,
        error: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            stage: stage.into(),
            success: false,
            failure_reason: Some(reason),
            error_message: Some(error.into()),
            duration_ms,
            started_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Log of all attempts made for one solution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackExecutionLog {
    /// All attempts made
    pub attempts: Vec<FallbackAttempt>,
    /// Total duration in milliseconds
    pub total_duration_ms: u64,
    /// Stage that produced the result (if any)
    pub successful_stage: Option<String>,
    /// Whether execution ultimately succeeded
    pub overall_success: bool,
}

impl FallbackExecutionLog {
    /// Create a new log
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attempt to the log
    pub fn add_attempt(&mut self, attempt: FallbackAttempt) {
        self.total_duration_ms += attempt.duration_ms;
        if attempt.success {
            self.successful_stage = Some(attempt.stage.clone());
            self.overall_success = true;
        }
        self.attempts.push(attempt);
    }

    /// Get the number of failed attempts
    pub fn failed_attempts_count(&self) -> usize {
        self.attempts.iter().filter(|a| !a.success).count()
    }

    /// Whether the fallback stage was reached
    pub fn used_fallback(&self) -> bool {
        self.attempts.len() > 1
    }
}

/// Errors from fallback execution
#[derive(Debug, Error)]
pub enum FallbackError {
    /// Cancellation ended the chain; the fallback was not attempted
    #[error("Execution cancelled")]
    Cancelled { log: FallbackExecutionLog },

    /// Primary and fallback both failed
    #[error("Primary stage failed ({primary}); fallback failed ({fallback})")]
    Exhausted {
        primary: AppError,
        fallback: AppError,
        log: FallbackExecutionLog,
    },
}

/// Result type for fallback operations
pub type FallbackResult<T> = Result<(T, FallbackExecutionLog), FallbackError>;

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Run `primary`, then `fallback` at most once.
///
/// The fallback is skipped when the primary failure is a cancellation or when
/// `token` has fired by the time the primary returns; in both cases the chain
/// ends with [`FallbackError::Cancelled`]. A cancelled fallback is reported the
/// same way.
pub async fn run_with_fallback<T, P, PF, F, FF>(
    token: &CancellationToken,
    primary_stage: &str,
    primary: P,
    fallback_stage: &str,
    fallback: F,
) -> FallbackResult<T>
where
    P: FnOnce() -> PF,
    PF: Future<Output = Result<T, AppError>>,
    F: FnOnce() -> FF,
    FF: Future<Output = Result<T, AppError>>,
{
    let mut log = FallbackExecutionLog::new();

    info!(stage = primary_stage, "attempting primary stage");
    let attempt_start = Instant::now();
    let primary_error = match primary().await {
        Ok(result) => {
            let duration_ms = elapsed_ms(attempt_start);
            info!(stage = primary_stage, duration_ms, "primary stage succeeded");
            log.add_attempt(FallbackAttempt::success(primary_stage, duration_ms));
            return Ok((result, log));
        }
        Err(e) => e,
    };

    let reason = if token.is_cancelled() {
        FailureReason::Cancelled
    } else {
        FailureReason::classify(&primary_error)
    };
    warn!(
        stage = primary_stage,
        reason = %reason,
        error = %primary_error,
        "primary stage failed"
    );
    log.add_attempt(FallbackAttempt::failure(
        primary_stage,
        reason,
        primary_error.to_string(),
        elapsed_ms(attempt_start),
    ));

    if !reason.should_fallback() {
        info!(stage = primary_stage, "cancelled, fallback suppressed");
        return Err(FallbackError::Cancelled { log });
    }

    warn!(stage = fallback_stage, "falling back");
    let attempt_start = Instant::now();
    match fallback().await {
        Ok(result) => {
            let duration_ms = elapsed_ms(attempt_start);
            info!(stage = fallback_stage, duration_ms, "fallback stage succeeded");
            log.add_attempt(FallbackAttempt::success(fallback_stage, duration_ms));
            Ok((result, log))
        }
        Err(fallback_error) => {
            let reason = if token.is_cancelled() {
                FailureReason::Cancelled
            } else {
                FailureReason::classify(&fallback_error)
            };
            log.add_attempt(FallbackAttempt::failure(
                fallback_stage,
                reason,
                fallback_error.to_string(),
                elapsed_ms(attempt_start),
            ));

            if reason == FailureReason::Cancelled {
                info!(stage = fallback_stage, "cancelled during fallback");
                return Err(FallbackError::Cancelled { log });
            }

            error!(
                primary = %primary_error,
                fallback = %fallback_error,
                "primary and fallback stages both failed"
            );
            Err(FallbackError::Exhausted {
                primary: primary_error,
                fallback: fallback_error,
                log,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::validator::ResponseError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn network(message: &str) -> AppError {
        AppError::Llm(LlmError::NetworkError {
            message: message.to_string(),
        })
    }

    #[test]
    fn test_failure_reason_display() {
        assert_eq!(FailureReason::Unavailable.to_string(), "unavailable");
        assert_eq!(FailureReason::Timeout.to_string(), "timeout");
        assert_eq!(FailureReason::RateLimited.to_string(), "rate_limited");
    }

    #[test]
    fn test_classify_errors() {
        assert_eq!(FailureReason::classify(&AppError::Cancelled), FailureReason::Cancelled);
        assert_eq!(
            FailureReason::classify(&AppError::Llm(LlmError::Cancelled)),
            FailureReason::Cancelled
        );
        assert_eq!(
            FailureReason::classify(&network("operation timed out")),
            FailureReason::Timeout
        );
        assert_eq!(
            FailureReason::classify(&network("connection reset")),
            FailureReason::NetworkError
        );
        let invalid = AppError::Response(ResponseError::mismatch("NarrativeSolutionData", "missing field", "{}"));
        assert_eq!(FailureReason::classify(&invalid), FailureReason::InvalidResponse);
        assert_eq!(
            FailureReason::classify(&AppError::internal("boom")),
            FailureReason::Error
        );
    }

    #[test]
    fn test_failure_reason_should_fallback() {
        assert!(FailureReason::Unavailable.should_fallback());
        assert!(FailureReason::Timeout.should_fallback());
        assert!(FailureReason::InvalidResponse.should_fallback());
        assert!(!FailureReason::Cancelled.should_fallback());
    }

    #[test]
    fn test_fallback_execution_log() {
        let mut log = FallbackExecutionLog::new();

        log.add_attempt(FallbackAttempt::failure(
            "narrative",
            FailureReason::InvalidResponse,
            "missing field",
            100,
        ));
        log.add_attempt(FallbackAttempt::success("standard", 200));

        assert_eq!(log.attempts.len(), 2);
        assert_eq!(log.failed_attempts_count(), 1);
        assert_eq!(log.successful_stage, Some("standard".to_string()));
        assert!(log.overall_success);
        assert!(log.used_fallback());
        assert_eq!(log.total_duration_ms, 300);
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let token = CancellationToken::new();
        let calls = AtomicUsize::new(0);

        let (value, log) = run_with_fallback(
            &token,
            "narrative",
            || async { Ok::<_, AppError>("primary") },
            "standard",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("fallback")
            },
        )
        .await
        .unwrap();

        assert_eq!(value, "primary");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!log.used_fallback());
    }

    #[tokio::test]
    async fn test_failure_runs_exactly_one_fallback() {
        let token = CancellationToken::new();

        let (value, log) = run_with_fallback(
            &token,
            "narrative",
            || async { Err::<&str, _>(network("connection refused")) },
            "standard",
            || async { Ok("fallback") },
        )
        .await
        .unwrap();

        assert_eq!(value, "fallback");
        assert_eq!(log.attempts.len(), 2);
        assert_eq!(
            log.attempts[0].failure_reason,
            Some(FailureReason::NetworkError)
        );
    }

    #[tokio::test]
    async fn test_both_failing_reports_both_errors() {
        let token = CancellationToken::new();

        let err = run_with_fallback(
            &token,
            "narrative",
            || async { Err::<(), _>(AppError::internal("first")) },
            "standard",
            || async { Err(AppError::internal("second")) },
        )
        .await
        .unwrap_err();

        match err {
            FallbackError::Exhausted {
                primary,
                fallback,
                log,
            } => {
                assert!(primary.to_string().contains("first"));
                assert!(fallback.to_string().contains("second"));
                assert_eq!(log.failed_attempts_count(), 2);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancellation_suppresses_fallback() {
        let token = CancellationToken::new();
        let calls = AtomicUsize::new(0);

        let err = run_with_fallback(
            &token,
            "narrative",
            || async { Err::<(), _>(AppError::Llm(LlmError::Cancelled)) },
            "standard",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
        .await
        .unwrap_err();

        match err {
            FallbackError::Cancelled { log } => assert_eq!(log.attempts.len(), 1),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fired_token_suppresses_fallback_for_other_errors() {
        let token = CancellationToken::new();
        token.cancel();

        let err = run_with_fallback(
            &token,
            "narrative",
            || async { Err::<(), _>(network("socket closed")) },
            "standard",
            || async { Ok(()) },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FallbackError::Cancelled { .. }));
    }
}
