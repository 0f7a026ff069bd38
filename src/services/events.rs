//! Session Events
//!
//! Typed notifications the workflow sends to the host. Emission is
//! fire-and-forget: a closed or missing receiver never fails the workflow.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::trace;

use interview_assist_core::ProgressSink;

use crate::models::{
    DebugSolutionData, OptimalImplementation, ProblemInfo, ProblemUnderstandingData,
    SolutionRecord,
};

/// Which pipeline an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pipeline {
    Main,
    Debug,
    Behavioral,
}

/// Notification sent to the host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Human-readable status with a coarse percentage
    Progress { message: String, progress: u8 },

    /// The queue to process was empty
    NoScreenshots,

    ProblemExtracted { problem: ProblemInfo },

    /// Understanding generated; waits for confirmation or clarification
    UnderstandingReady { understanding: ProblemUnderstandingData },

    SolutionReady { solution: SolutionRecord },

    /// A follow-up appended `revision` as history entry `index`
    FollowUpReady {
        revision: OptimalImplementation,
        index: usize,
    },

    DebugStarted,

    DebugReady { debug: DebugSolutionData },

    Error { pipeline: Pipeline, message: String },

    /// The session went back to idle
    Reset,
}

/// Receiver of session events
pub trait EventSink: Send + Sync {
    /// Deliver an event. Must not block.
    fn emit(&self, event: SessionEvent);
}

/// Forwards events into an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// Sink plus the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            trace!("event receiver dropped");
        }
    }
}

/// Drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: SessionEvent) {}
}

/// Reports progress as [`SessionEvent::Progress`]
#[derive(Clone)]
pub struct EventProgress {
    sink: Arc<dyn EventSink>,
}

impl EventProgress {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }
}

impl ProgressSink for EventProgress {
    fn notify(&self, message: &str, progress: u8) {
        self.sink.emit(SessionEvent::Progress {
            message: message.to_string(),
            progress: progress.min(100),
        });
    }
}
