//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod behavioral;
pub mod problem;
pub mod settings;
pub mod solution;

pub use behavioral::*;
pub use problem::*;
pub use settings::*;
pub use solution::*;
