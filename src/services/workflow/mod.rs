//! Session Workflow
//!
//! Phase table, session state and the workflow driver.

mod phase;
mod session;
mod state;

pub use phase::SessionPhase;
pub use session::{ProcessOutcome, SessionWorkflow};
pub use state::{SessionSnapshot, SessionState};
