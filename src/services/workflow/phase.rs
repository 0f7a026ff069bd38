//! Session Phases
//!
//! The coding session is a small state machine. Every public workflow
//! operation checks its transition against [`SessionPhase::can_transition_to`]
//! before spending an LLM call.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Nothing submitted yet, or reset
    #[default]
    Idle,
    /// Reading the problem out of the screenshots
    Extracting,
    /// Understanding shown to the user, waiting for confirm or clarification
    AwaitingConfirmation,
    /// Regenerating the understanding from a clarification
    Clarifying,
    /// Orchestrator running
    Solving,
    SolutionReady,
    /// Revising the latest implementation
    FollowUp,
    /// Unrecoverable failure; only `reset` leaves it
    Error,
    /// Aborted by the user
    Cancelled,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Extracting => "extracting",
            SessionPhase::AwaitingConfirmation => "awaiting_confirmation",
            SessionPhase::Clarifying => "clarifying",
            SessionPhase::Solving => "solving",
            SessionPhase::SolutionReady => "solution_ready",
            SessionPhase::FollowUp => "follow_up",
            SessionPhase::Error => "error",
            SessionPhase::Cancelled => "cancelled",
        }
    }

    /// Human-readable label for status lines
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::Extracting => "Extracting problem",
            SessionPhase::AwaitingConfirmation => "Awaiting confirmation",
            SessionPhase::Clarifying => "Refining understanding",
            SessionPhase::Solving => "Generating solution",
            SessionPhase::SolutionReady => "Solution ready",
            SessionPhase::FollowUp => "Answering follow-up",
            SessionPhase::Error => "Error",
            SessionPhase::Cancelled => "Cancelled",
        }
    }

    /// An LLM call chain is running in this phase
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SessionPhase::Extracting
                | SessionPhase::Clarifying
                | SessionPhase::Solving
                | SessionPhase::FollowUp
        )
    }

    /// Transition table. `reset` bypasses it: every phase may return to Idle.
    ///
    /// A new batch may start while extraction or solving is in flight; it
    /// preempts the running chain.
    pub fn can_transition_to(&self, next: SessionPhase) -> bool {
        use SessionPhase::*;

        match (self, next) {
            (
                Idle | Extracting | AwaitingConfirmation | Clarifying | Solving | Cancelled,
                Extracting,
            ) => true,
            (Extracting, AwaitingConfirmation | Solving) => true,
            (AwaitingConfirmation, Clarifying | Solving) => true,
            (Clarifying, AwaitingConfirmation) => true,
            (Solving, SolutionReady) => true,
            (SolutionReady, FollowUp) => true,
            (FollowUp, SolutionReady) => true,
            (Extracting | Clarifying | Solving | FollowUp, Error) => true,
            (Extracting | AwaitingConfirmation | Clarifying | Solving | FollowUp, Cancelled) => {
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
