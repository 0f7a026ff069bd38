//! Session State
//!
//! Everything one coding session has produced so far. Written only by the
//! workflow, under its lock, and only by a chain whose token is still live.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::models::{
    ConfirmedUnderstanding, DebugSolutionData, ImplementationHistory, OptimalImplementation,
    ProblemInfo, ProblemUnderstandingData, SolutionRecord,
};
use crate::utils::error::{AppError, AppResult};

use super::phase::SessionPhase;

#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: String,
    pub phase: SessionPhase,
    pub problem_info: Option<ProblemInfo>,
    /// Latest generated understanding, kept so a clarification can refer to it
    pub understanding: Option<ProblemUnderstandingData>,
    pub confirmed: Option<ConfirmedUnderstanding>,
    pub solution: Option<SolutionRecord>,
    pub history: Option<ImplementationHistory>,
    pub debug: Option<DebugSolutionData>,
    pub updated_at: DateTime<Utc>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            phase: SessionPhase::Idle,
            problem_info: None,
            understanding: None,
            confirmed: None,
            solution: None,
            history: None,
            debug: None,
            updated_at: Utc::now(),
        }
    }
}

impl SessionState {
    /// Move to `next` if the transition table allows it
    pub fn transition(&mut self, next: SessionPhase) -> AppResult<()> {
        if !self.phase.can_transition_to(next) {
            return Err(AppError::precondition(format!(
                "Cannot move from {} to {}",
                self.phase, next
            )));
        }
        info!(session_id = %self.session_id, from = %self.phase, to = %next, "session phase changed");
        self.set_phase(next);
        Ok(())
    }

    pub fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Drop every result, keeping the session id and phase
    pub fn clear_results(&mut self) {
        self.problem_info = None;
        self.understanding = None;
        self.confirmed = None;
        self.solution = None;
        self.history = None;
        self.debug = None;
        self.touch();
    }

    /// Store a fresh solution; its implementation becomes history entry 0
    pub fn set_solution(&mut self, record: SolutionRecord) {
        self.history = Some(ImplementationHistory::new(record.optimal_implementation()));
        self.solution = Some(record);
        self.debug = None;
        self.touch();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            phase: self.phase,
            problem_info: self.problem_info.clone(),
            understanding: self.understanding.clone(),
            confirmed: self.confirmed.clone(),
            solution: self.solution.clone(),
            history: self
                .history
                .as_ref()
                .map(|history| history.entries().to_vec())
                .unwrap_or_default(),
            debug: self.debug.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Read-only copy of the session handed to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: SessionPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_info: Option<ProblemInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub understanding: Option<ProblemUnderstandingData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<ConfirmedUnderstanding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<SolutionRecord>,
    /// Implementation revisions, original first
    #[serde(default)]
    pub history: Vec<OptimalImplementation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugSolutionData>,
    pub updated_at: DateTime<Utc>,
}
