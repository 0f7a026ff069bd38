//! Storage Layer
//!
//! JSON config persistence and the read-only behavioral story library.

pub mod config;
pub mod stories;

pub use config::*;
pub use stories::*;
