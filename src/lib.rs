//! Interview Assist - Rust Backend Library
//!
//! Core of the interview assistant. It includes:
//! - The session workflow from screenshots to a solution, with follow-ups and debugging
//! - The multi-stage solution orchestrator and its one-level fallback
//! - Parsers for markdown and JSON model responses
//! - The behavioral (STAR story) assistant
//! - Storage for settings and behavioral data

pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::*;
pub use services::{
    AiService, BehavioralAssistant, ChannelEventSink, FileScreenshotStore, ProcessOutcome,
    SessionEvent, SessionPhase, SessionSnapshot, SessionWorkflow, SolutionOrchestrator,
};
pub use storage::{ConfigService, SettingsSource, StoryLibrary};
pub use utils::error::{AppError, AppResult};
