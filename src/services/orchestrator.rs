//! Multi-Stage Solution Orchestrator
//!
//! Sequences the LLM calls that turn a confirmed problem into a
//! [`SolutionRecord`]. The primary path is chosen by [`SolutionMode`]; any
//! genuine failure of the primary path is followed by exactly one call to the
//! standard one-shot prompt. Cancellation never triggers the fallback.
//!
//! Stages inside one path run strictly in sequence: the optimize call of the
//! detailed path consumes the parsed brute force.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use interview_assist_core::ProgressSink;
use interview_assist_llm::{CompletionClient, CompletionRequest};

use crate::models::{ConfirmedUnderstanding, ProblemInfo, SolutionMode, SolutionRecord};
use crate::services::fallback::{run_with_fallback, FallbackError, FallbackExecutionLog};
use crate::services::parser::{parse_brute_force, parse_detailed, parse_standard_solution};
use crate::services::prompts::{self, PromptPair};
use crate::services::validator::{parse_four_quadrant, parse_narrative_solution};
use crate::utils::error::{AppError, AppResult};

/// Stage name of the shared fallback
pub const STANDARD_STAGE: &str = "standard";

/// Inputs of one solution run
#[derive(Debug, Clone, Copy)]
pub struct SolutionRequest<'a> {
    pub problem_info: Option<&'a ProblemInfo>,
    pub confirmed: Option<&'a ConfirmedUnderstanding>,
    pub language: &'a str,
    pub mode: SolutionMode,
}

/// A finished solution plus the attempts that produced it
#[derive(Debug, Clone)]
pub struct OrchestratedSolution {
    pub record: SolutionRecord,
    pub log: FallbackExecutionLog,
}

/// Why no solution was produced
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// The run was cancelled; the fallback was not attempted
    #[error("Solution generation cancelled")]
    Cancelled,

    /// Required input was missing; no LLM call was made
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Primary path and fallback both failed
    #[error("Failed to generate solution: {primary}")]
    Failed {
        primary: AppError,
        fallback: AppError,
        log: FallbackExecutionLog,
    },
}

impl From<OrchestrationError> for AppError {
    fn from(err: OrchestrationError) -> Self {
        match err {
            OrchestrationError::Cancelled => AppError::Cancelled,
            OrchestrationError::Precondition(msg) => AppError::Precondition(msg),
            OrchestrationError::Failed { primary, .. } => primary,
        }
    }
}

/// Drives the primary and fallback solution paths over one completion client
#[derive(Clone)]
pub struct SolutionOrchestrator {
    client: Arc<dyn CompletionClient>,
}

impl SolutionOrchestrator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Produce a solution for `request`.
    ///
    /// Preconditions are checked before any call. Progress is reported
    /// before and after each call and always precedes the returned value.
    pub async fn generate(
        &self,
        request: SolutionRequest<'_>,
        progress: &dyn ProgressSink,
        token: &CancellationToken,
    ) -> Result<OrchestratedSolution, OrchestrationError> {
        let info = request.problem_info.ok_or_else(|| {
            OrchestrationError::Precondition(
                "No problem info available for solution generation.".to_string(),
            )
        })?;
        let confirmed = match (request.mode, request.confirmed) {
            (SolutionMode::Detailed, confirmed) => confirmed,
            (_, Some(confirmed)) => Some(confirmed),
            (_, None) => {
                return Err(OrchestrationError::Precondition(
                    "Confirmed understanding is missing for solution generation.".to_string(),
                ))
            }
        };
        if token.is_cancelled() {
            return Err(OrchestrationError::Cancelled);
        }

        let mode = request.mode;
        let language = request.language;
        info!(mode = mode.as_str(), language, "generating solution");

        let outcome = run_with_fallback(
            token,
            mode.as_str(),
            || async move {
                match (mode, confirmed) {
                    (SolutionMode::Detailed, _) => {
                        self.detailed(info, language, progress, token).await
                    }
                    (SolutionMode::FourQuadrant, Some(confirmed)) => {
                        self.four_quadrant(info, confirmed, language, progress, token)
                            .await
                    }
                    (_, Some(confirmed)) => {
                        self.narrative(info, confirmed, language, progress, token)
                            .await
                    }
                    (_, None) => Err(AppError::precondition(
                        "Confirmed understanding is missing for solution generation.",
                    )),
                }
            },
            STANDARD_STAGE,
            || self.standard(info, language, progress, token),
        )
        .await;

        match outcome {
            Ok((record, log)) => {
                progress.notify("Solution generated", 100);
                info!(
                    kind = record.kind(),
                    attempts = log.attempts.len(),
                    "solution ready"
                );
                Ok(OrchestratedSolution { record, log })
            }
            Err(FallbackError::Cancelled { .. }) => Err(OrchestrationError::Cancelled),
            Err(FallbackError::Exhausted {
                primary,
                fallback,
                log,
            }) => Err(OrchestrationError::Failed {
                primary,
                fallback,
                log,
            }),
        }
    }

    async fn call(&self, pair: PromptPair, token: &CancellationToken) -> AppResult<String> {
        let raw = self
            .client
            .complete(CompletionRequest::new(pair.prompt, pair.system_prompt), token)
            .await?;
        debug!(chars = raw.len(), "received completion");
        Ok(raw)
    }

    async fn narrative(
        &self,
        info: &ProblemInfo,
        confirmed: &ConfirmedUnderstanding,
        language: &str,
        progress: &dyn ProgressSink,
        token: &CancellationToken,
    ) -> AppResult<SolutionRecord> {
        progress.notify("Generating solution narrative...", 60);
        let raw = self
            .call(
                prompts::narrative_prompt(
                    language,
                    info,
                    &confirmed.understanding,
                    &confirmed.examples,
                ),
                token,
            )
            .await?;
        progress.notify("Validating solution structure...", 90);
        Ok(SolutionRecord::Narrative(parse_narrative_solution(&raw)?))
    }

    async fn detailed(
        &self,
        info: &ProblemInfo,
        language: &str,
        progress: &dyn ProgressSink,
        token: &CancellationToken,
    ) -> AppResult<SolutionRecord> {
        progress.notify("Generating brute force solution...", 40);
        let brute_raw = self
            .call(prompts::brute_force_prompt(language, info), token)
            .await?;

        progress.notify("Analyzing brute force solution for optimizations...", 60);
        let brute = parse_brute_force(&brute_raw);
        let optimized_raw = self
            .call(
                prompts::optimized_prompt(
                    language,
                    info,
                    &brute.code,
                    &brute.complexity.time.notation,
                    &brute.complexity.space.notation,
                ),
                token,
            )
            .await?;

        progress.notify("Finalizing optimized solution...", 80);
        Ok(SolutionRecord::Detailed(parse_detailed(
            info.statement_or(""),
            &brute_raw,
            &optimized_raw,
        )))
    }

    async fn four_quadrant(
        &self,
        info: &ProblemInfo,
        confirmed: &ConfirmedUnderstanding,
        language: &str,
        progress: &dyn ProgressSink,
        token: &CancellationToken,
    ) -> AppResult<SolutionRecord> {
        progress.notify("Generating comprehensive analysis...", 60);
        let raw = self
            .call(
                prompts::four_quadrant_prompt(
                    language,
                    info,
                    &confirmed.understanding,
                    &confirmed.examples,
                ),
                token,
            )
            .await?;
        progress.notify("Organizing analysis sections...", 90);
        Ok(SolutionRecord::FourQuadrant(parse_four_quadrant(&raw)?))
    }

    async fn standard(
        &self,
        info: &ProblemInfo,
        language: &str,
        progress: &dyn ProgressSink,
        token: &CancellationToken,
    ) -> AppResult<SolutionRecord> {
        progress.notify("Falling back to standard solution generation...", 70);
        let raw = self
            .call(prompts::standard_solution_prompt(language, info), token)
            .await?;
        progress.notify("Parsing standard solution...", 90);
        Ok(SolutionRecord::Basic(parse_standard_solution(&raw)))
    }
}
