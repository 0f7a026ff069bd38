//! Interview Assist Core
//!
//! Foundational types shared by every crate in the Interview Assist workspace.
//! This crate has zero dependencies on application-level code (LLM providers,
//! screenshot storage, session workflow).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `proxy` - Proxy configuration data types shared by the HTTP-using crates
//! - `progress` - Fire-and-forget progress reporting (`ProgressSink`, `NoopProgress`)
//!
//! ## Design Principles
//!
//! 1. **Only serde/thiserror** - keeps build times minimal
//! 2. **Trait-based seams** - progress observers can be swapped for tests
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod error;
pub mod progress;
pub mod proxy;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Progress Reporting ─────────────────────────────────────────────────
pub use progress::{NoopProgress, ProgressSink};

// ── Proxy Types ────────────────────────────────────────────────────────
pub use proxy::{ProxyConfig, ProxyProtocol};
