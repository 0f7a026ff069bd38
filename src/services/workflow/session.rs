//! Session Workflow
//!
//! Drives one coding session from a screenshot batch to a solution and its
//! follow-ups, plus the independent debug pipeline over extra screenshots.
//!
//! Two cancellation tokens exist: one for the primary chain and one for debug.
//! Starting a primary chain cancels and replaces the previous primary token,
//! so at most one primary chain writes session state. A chain re-checks its
//! token under the state lock before every write and discards its results
//! once cancelled.

use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use interview_assist_core::ProgressSink;
use interview_assist_llm::{CompletionClient, CompletionRequest, ImageData};

use crate::models::{
    AppConfig, ConfirmedUnderstanding, DebugSolutionData, InitialAnalysis, OptimalImplementation,
    ProblemInfo, ProblemUnderstandingData, SolutionRecord,
};
use crate::services::events::{EventProgress, EventSink, Pipeline, SessionEvent};
use crate::services::orchestrator::{SolutionOrchestrator, SolutionRequest};
use crate::services::parser::parse_debug;
use crate::services::prompts::{self, PromptPair};
use crate::services::screenshots::{load_batch, LoadedScreenshot, ScreenshotStore};
use crate::services::validator::{
    parse_follow_up, parse_initial_analysis, parse_problem_info, parse_refined_understanding,
};
use crate::storage::config::SettingsSource;
use crate::utils::error::{AppError, AppResult};

use super::phase::SessionPhase;
use super::state::{SessionSnapshot, SessionState};

/// What a screenshot-processing request ended with
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// The queue was empty; nothing happened
    NoScreenshots,
    /// Understanding generated; confirm or clarify next
    AwaitingConfirmation(ProblemUnderstandingData),
    /// Examples were present, so the solution was generated directly
    Solved(SolutionRecord),
    Debugged(DebugSolutionData),
}

pub struct SessionWorkflow {
    client: Arc<dyn CompletionClient>,
    store: Arc<dyn ScreenshotStore>,
    settings: Arc<dyn SettingsSource>,
    events: Arc<dyn EventSink>,
    orchestrator: SolutionOrchestrator,
    state: RwLock<SessionState>,
    primary: Mutex<CancellationToken>,
    debug: Mutex<CancellationToken>,
}

/// Cancel the token in `slot` and install a fresh one
fn replace_token(slot: &Mutex<CancellationToken>) -> CancellationToken {
    let mut guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.cancel();
    *guard = CancellationToken::new();
    guard.clone()
}

fn cancel_token(slot: &Mutex<CancellationToken>) {
    slot.lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .cancel();
}

impl SessionWorkflow {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        store: Arc<dyn ScreenshotStore>,
        settings: Arc<dyn SettingsSource>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            orchestrator: SolutionOrchestrator::new(Arc::clone(&client)),
            client,
            store,
            settings,
            events,
            state: RwLock::new(SessionState::default()),
            primary: Mutex::new(CancellationToken::new()),
            debug: Mutex::new(CancellationToken::new()),
        }
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.read().await.phase
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.snapshot()
    }

    fn progress(&self) -> EventProgress {
        EventProgress::new(Arc::clone(&self.events))
    }

    // ========================================================================
    // Chain bookkeeping
    // ========================================================================

    /// Report a failure that happened before any chain started
    fn reject(&self, pipeline: Pipeline, err: AppError) -> AppError {
        warn!(pipeline = ?pipeline, error = %err, "request rejected");
        self.events.emit(SessionEvent::Error {
            pipeline,
            message: err.to_string(),
        });
        err
    }

    fn current_settings(&self, pipeline: Pipeline) -> AppResult<AppConfig> {
        self.settings
            .current_settings()
            .map_err(|e| self.reject(pipeline, e))
    }

    /// Start a primary chain entering `next`.
    ///
    /// The transition and `prepare` are checked before the previous chain is
    /// cancelled, so a rejected request leaves the running chain alone.
    async fn begin_primary<R>(
        &self,
        next: SessionPhase,
        prepare: impl FnOnce(&mut SessionState) -> AppResult<R>,
    ) -> AppResult<(CancellationToken, R)> {
        let mut state = self.state.write().await;
        if !state.phase.can_transition_to(next) {
            let err = AppError::precondition(format!("Cannot move from {} to {}", state.phase, next));
            return Err(self.reject(Pipeline::Main, err));
        }
        let prepared = prepare(&mut *state).map_err(|e| self.reject(Pipeline::Main, e))?;

        let token = replace_token(&self.primary);
        state.transition(next)?;
        Ok((token, prepared))
    }

    /// Apply `write` unless `token` was cancelled in the meantime
    async fn commit<R>(
        &self,
        token: &CancellationToken,
        write: impl FnOnce(&mut SessionState) -> AppResult<R>,
    ) -> AppResult<R> {
        let mut state = self.state.write().await;
        if token.is_cancelled() {
            debug!(session_id = %state.session_id, "discarding results of cancelled chain");
            return Err(AppError::Cancelled);
        }
        write(&mut *state)
    }

    /// End a primary chain with `err`, moving to `next` when still live
    async fn fail(
        &self,
        token: &CancellationToken,
        next: SessionPhase,
        err: AppError,
    ) -> AppError {
        let mut state = self.state.write().await;
        if token.is_cancelled() {
            return AppError::Cancelled;
        }
        if err.is_cancelled() {
            state.clear_results();
            state.set_phase(SessionPhase::Cancelled);
            return AppError::Cancelled;
        }

        error!(session_id = %state.session_id, phase = %state.phase, error = %err, "session step failed");
        if let Err(e) = state.transition(next) {
            warn!(error = %e, "failure transition rejected, forcing error phase");
            state.set_phase(SessionPhase::Error);
        }
        self.events.emit(SessionEvent::Error {
            pipeline: Pipeline::Main,
            message: err.to_string(),
        });
        err
    }

    async fn call(
        &self,
        pair: PromptPair,
        images: Vec<ImageData>,
        token: &CancellationToken,
    ) -> AppResult<String> {
        let request = CompletionRequest::new(pair.prompt, pair.system_prompt).with_images(images);
        let raw = self.client.complete(request, token).await?;
        debug!(chars = raw.len(), "received completion");
        Ok(raw)
    }

    // ========================================================================
    // Main pipeline
    // ========================================================================

    /// Process the queue, or run the debug pipeline when a solution exists
    pub async fn process_screenshots(&self) -> AppResult<ProcessOutcome> {
        let has_solution = {
            let state = self.state.read().await;
            state.solution.is_some()
                && matches!(state.phase, SessionPhase::SolutionReady | SessionPhase::FollowUp)
        };
        if has_solution {
            self.process_debug().await
        } else {
            self.process_queue().await
        }
    }

    /// Extract the problem from the main queue and generate an understanding.
    ///
    /// When the screenshots already carry examples the understanding step is
    /// skipped and the solution is generated in the same chain.
    pub async fn process_queue(&self) -> AppResult<ProcessOutcome> {
        let queue = self.store.queue();
        if queue.is_empty() {
            info!("screenshot queue is empty");
            self.events.emit(SessionEvent::NoScreenshots);
            return Ok(ProcessOutcome::NoScreenshots);
        }

        {
            let state = self.state.read().await;
            if !state.phase.can_transition_to(SessionPhase::Extracting) {
                let err = AppError::precondition(format!(
                    "Cannot move from {} to {}",
                    state.phase,
                    SessionPhase::Extracting
                ));
                return Err(self.reject(Pipeline::Main, err));
            }
        }
        let settings = self.current_settings(Pipeline::Main)?;
        let screenshots = load_batch(self.store.as_ref(), &queue)
            .await
            .map_err(|e| self.reject(Pipeline::Main, e))?;

        let (token, session_id) = self
            .begin_primary(SessionPhase::Extracting, |state| {
                state.clear_results();
                state.session_id = Uuid::new_v4().to_string();
                Ok(state.session_id.clone())
            })
            .await?;
        info!(session_id = %session_id, screenshots = screenshots.len(), "processing screenshot batch");

        let progress = self.progress();
        progress.notify("Extracting problem information...", 20);
        let images = screenshots.into_iter().map(LoadedScreenshot::into_image).collect();
        let info = match self.extract(&settings.language, images, &token).await {
            Ok(info) => info,
            Err(e) => return Err(self.fail(&token, SessionPhase::Error, e).await),
        };
        self.commit(&token, |state| {
            state.problem_info = Some(info.clone());
            state.touch();
            Ok(())
        })
        .await?;
        self.events.emit(SessionEvent::ProblemExtracted {
            problem: info.clone(),
        });

        progress.notify("Analyzing problem understanding...", 40);
        let analysis = match self.analyze(&info, &token).await {
            Ok(analysis) => analysis,
            Err(e) => return Err(self.fail(&token, SessionPhase::Error, e).await),
        };

        match analysis {
            InitialAnalysis::ExamplesPresent => {
                progress.notify("Examples found in screenshots, generating solution...", 45);
                self.commit(&token, |state| {
                    state.confirmed = Some(ConfirmedUnderstanding::from_extraction(&info));
                    state.transition(SessionPhase::Solving)
                })
                .await?;
                self.solve(&settings, &token).await.map(ProcessOutcome::Solved)
            }
            InitialAnalysis::Understanding(understanding) => {
                self.commit(&token, |state| {
                    state.understanding = Some(understanding.clone());
                    state.transition(SessionPhase::AwaitingConfirmation)
                })
                .await?;
                self.events.emit(SessionEvent::UnderstandingReady {
                    understanding: understanding.clone(),
                });
                Ok(ProcessOutcome::AwaitingConfirmation(understanding))
            }
        }
    }

    async fn extract(
        &self,
        language: &str,
        images: Vec<ImageData>,
        token: &CancellationToken,
    ) -> AppResult<ProblemInfo> {
        let raw = self
            .call(prompts::extraction_prompt(language), images, token)
            .await?;
        Ok(parse_problem_info(&raw)?)
    }

    async fn analyze(
        &self,
        info: &ProblemInfo,
        token: &CancellationToken,
    ) -> AppResult<InitialAnalysis> {
        let raw = self
            .call(prompts::understanding_prompt(info), Vec::new(), token)
            .await?;
        Ok(parse_initial_analysis(&raw)?)
    }

    /// Regenerate the understanding from the user's clarification.
    ///
    /// The prompt carries the current understanding, examples and questions.
    /// On failure the previous understanding stays in place.
    pub async fn submit_clarification(
        &self,
        clarification: &str,
    ) -> AppResult<ProblemUnderstandingData> {
        let clarification = clarification.trim();
        if clarification.is_empty() {
            return Err(self.reject(
                Pipeline::Main,
                AppError::validation("Clarification cannot be empty"),
            ));
        }

        let (token, (info, previous)) = self
            .begin_primary(SessionPhase::Clarifying, |state| {
                let info = state.problem_info.clone().ok_or_else(|| {
                    AppError::precondition("No problem info available for clarification.")
                })?;
                let previous = state.understanding.clone().ok_or_else(|| {
                    AppError::precondition("No understanding available to clarify.")
                })?;
                Ok((info, previous))
            })
            .await?;

        self.progress()
            .notify("Refining understanding based on your clarification...", 55);
        let pair = prompts::refined_understanding_prompt(
            &info,
            &previous.understanding_statement,
            &previous.generated_examples,
            &previous.clarifying_questions,
            clarification,
        );
        let refined = match self
            .call(pair, Vec::new(), &token)
            .await
            .and_then(|raw| Ok(parse_refined_understanding(&raw)?))
        {
            Ok(refined) => refined,
            Err(e) => {
                return Err(self
                    .fail(&token, SessionPhase::AwaitingConfirmation, e)
                    .await)
            }
        };

        self.commit(&token, |state| {
            state.understanding = Some(refined.clone());
            state.transition(SessionPhase::AwaitingConfirmation)
        })
        .await?;
        self.events.emit(SessionEvent::UnderstandingReady {
            understanding: refined.clone(),
        });
        Ok(refined)
    }

    /// Freeze the current understanding and generate the solution
    pub async fn confirm_understanding(&self) -> AppResult<SolutionRecord> {
        let settings = self.current_settings(Pipeline::Main)?;
        let (token, ()) = self
            .begin_primary(SessionPhase::Solving, |state| {
                let understanding = state.understanding.as_ref().ok_or_else(|| {
                    AppError::precondition("No understanding available to confirm.")
                })?;
                state.confirmed = Some(ConfirmedUnderstanding::from_understanding(understanding));
                Ok(())
            })
            .await?;

        self.progress()
            .notify("Understanding confirmed, generating solution...", 50);
        self.solve(&settings, &token).await
    }

    async fn solve(
        &self,
        settings: &AppConfig,
        token: &CancellationToken,
    ) -> AppResult<SolutionRecord> {
        let (info, confirmed) = {
            let state = self.state.read().await;
            (state.problem_info.clone(), state.confirmed.clone())
        };
        let request = SolutionRequest {
            problem_info: info.as_ref(),
            confirmed: confirmed.as_ref(),
            language: &settings.language,
            mode: settings.solution_mode,
        };

        let solution = match self.orchestrator.generate(request, &self.progress(), token).await {
            Ok(solution) => solution,
            Err(e) => return Err(self.fail(token, SessionPhase::Error, e.into()).await),
        };
        if solution.log.used_fallback() {
            warn!(
                attempts = solution.log.attempts.len(),
                "solution produced by the fallback path"
            );
        }

        let record = solution.record;
        self.commit(token, |state| {
            state.set_solution(record.clone());
            state.transition(SessionPhase::SolutionReady)
        })
        .await?;
        self.events.emit(SessionEvent::SolutionReady {
            solution: record.clone(),
        });
        Ok(record)
    }

    /// Ask about or revise the latest implementation.
    ///
    /// A successful answer is appended to the history; earlier entries and
    /// the rest of the solution are never touched.
    pub async fn submit_follow_up(&self, question: &str) -> AppResult<OptimalImplementation> {
        let question = question.trim();
        if question.is_empty() {
            return Err(self.reject(
                Pipeline::Main,
                AppError::validation("Follow-up question cannot be empty"),
            ));
        }
        let settings = self.current_settings(Pipeline::Main)?;

        let (token, (analysis, previous)) = self
            .begin_primary(SessionPhase::FollowUp, |state| {
                let (solution, history) = match (&state.solution, &state.history) {
                    (Some(solution), Some(history)) => (solution, history),
                    _ => {
                        return Err(AppError::precondition(
                            "No solution available for follow-up.",
                        ))
                    }
                };
                let analysis = solution
                    .problem_analysis()
                    .map(str::to_string)
                    .or_else(|| {
                        state
                            .problem_info
                            .as_ref()
                            .map(|info| info.statement_or("Not specified").to_string())
                    })
                    .unwrap_or_else(|| "Not specified".to_string());
                Ok((analysis, history.latest().clone()))
            })
            .await?;

        let progress = self.progress();
        progress.notify("Processing follow-up question...", 30);
        let pair = prompts::follow_up_prompt(&settings.language, &analysis, &previous, question);
        let revision = match self
            .call(pair, Vec::new(), &token)
            .await
            .and_then(|raw| Ok(parse_follow_up(&raw)?))
        {
            Ok(revision) => revision,
            Err(e) => return Err(self.fail(&token, SessionPhase::SolutionReady, e).await),
        };
        progress.notify("Follow-up answered", 100);

        let index = self
            .commit(&token, |state| {
                let history = state
                    .history
                    .as_mut()
                    .ok_or_else(|| AppError::internal("history missing after follow-up"))?;
                history.push(revision.clone());
                let index = history.len() - 1;
                state.transition(SessionPhase::SolutionReady)?;
                Ok(index)
            })
            .await?;
        self.events.emit(SessionEvent::FollowUpReady {
            revision: revision.clone(),
            index,
        });
        Ok(revision)
    }

    // ========================================================================
    // Debug pipeline
    // ========================================================================

    /// Analyze the extra screenshots against the current code.
    ///
    /// Runs under its own token and never changes the primary phase.
    pub async fn process_debug(&self) -> AppResult<ProcessOutcome> {
        let extra = self.store.extra_queue();
        if extra.is_empty() {
            info!("extra screenshot queue is empty");
            self.events.emit(SessionEvent::NoScreenshots);
            return Ok(ProcessOutcome::NoScreenshots);
        }

        let (info, current_code) = {
            let state = self.state.read().await;
            let info = state.problem_info.clone().ok_or_else(|| {
                self.reject(
                    Pipeline::Debug,
                    AppError::precondition("No problem info available for debugging."),
                )
            })?;
            let code = state
                .history
                .as_ref()
                .map(|history| history.latest().code.clone())
                .ok_or_else(|| {
                    self.reject(
                        Pipeline::Debug,
                        AppError::precondition("No solution available to debug."),
                    )
                })?;
            (info, code)
        };
        let settings = self.current_settings(Pipeline::Debug)?;

        let token = replace_token(&self.debug);
        self.events.emit(SessionEvent::DebugStarted);
        info!(extra = extra.len(), "processing debug screenshots");

        let progress = self.progress();
        progress.notify("Processing debug screenshots...", 30);
        let mut paths = self.store.queue();
        paths.extend(extra);

        let result = async {
            let screenshots = load_batch(self.store.as_ref(), &paths).await?;
            progress.notify("Analyzing code and generating debug feedback...", 60);
            let images = screenshots.into_iter().map(LoadedScreenshot::into_image).collect();
            let pair = prompts::debug_prompt(&settings.language, &info, Some(&current_code));
            let raw = self.call(pair, images, &token).await?;
            Ok::<_, AppError>(parse_debug(&raw))
        }
        .await;

        let analysis = match result {
            Ok(analysis) => analysis,
            Err(e) if token.is_cancelled() || e.is_cancelled() => return Err(AppError::Cancelled),
            Err(e) => {
                error!(error = %e, "debug pipeline failed");
                self.events.emit(SessionEvent::Error {
                    pipeline: Pipeline::Debug,
                    message: e.to_string(),
                });
                return Err(e);
            }
        };
        progress.notify("Debug analysis complete", 100);

        self.commit(&token, |state| {
            if state.solution.is_none() {
                return Err(AppError::Cancelled);
            }
            state.debug = Some(analysis.clone());
            state.touch();
            Ok(())
        })
        .await?;
        self.events.emit(SessionEvent::DebugReady {
            debug: analysis.clone(),
        });
        Ok(ProcessOutcome::Debugged(analysis))
    }

    // ========================================================================
    // Cancellation and reset
    // ========================================================================

    /// Abort both pipelines.
    ///
    /// A session with a chain in flight or an understanding pending moves to
    /// `Cancelled` and loses its results; a finished solution is kept.
    pub async fn cancel(&self) {
        cancel_token(&self.primary);
        cancel_token(&self.debug);

        let mut state = self.state.write().await;
        if state.phase.can_transition_to(SessionPhase::Cancelled) {
            info!(session_id = %state.session_id, phase = %state.phase, "cancelling session");
            state.clear_results();
            state.set_phase(SessionPhase::Cancelled);
        }
    }

    /// Cancel everything and start over from Idle
    pub async fn reset(&self) {
        cancel_token(&self.primary);
        cancel_token(&self.debug);

        let mut state = self.state.write().await;
        info!(session_id = %state.session_id, phase = %state.phase, "resetting session");
        *state = SessionState::default();
        self.events.emit(SessionEvent::Reset);
    }
}
