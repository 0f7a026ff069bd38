//! Services
//!
//! Business logic for the coding and behavioral workflows.
//! Services are constructed once by the host and shared behind `Arc`s.

pub mod ai;
pub mod behavioral;
pub mod events;
pub mod fallback;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod screenshots;
pub mod validator;
pub mod workflow;

pub use ai::AiService;
pub use behavioral::BehavioralAssistant;
pub use events::{ChannelEventSink, EventProgress, EventSink, NoopEventSink, Pipeline, SessionEvent};
pub use orchestrator::{OrchestratedSolution, OrchestrationError, SolutionOrchestrator, SolutionRequest};
pub use screenshots::{load_batch, FileScreenshotStore, LoadedScreenshot, ScreenshotStore};
pub use workflow::{ProcessOutcome, SessionPhase, SessionSnapshot, SessionWorkflow};
