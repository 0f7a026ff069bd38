//! Text Extraction Parser
//!
//! Best-effort extraction of code, complexity, dry-run and bullet fields from
//! markdown LLM responses. Every heuristic is an ordered list of named
//! strategies, and every field resolves to a documented default instead of
//! failing.

pub mod bullets;
pub mod code;
pub mod complexity;
pub mod dry_run;
pub mod responses;
pub mod sections;
pub mod strategy;

pub use bullets::{extract_thoughts, list_items, THOUGHTS_PLACEHOLDER};
pub use code::{extract_code, NO_CODE_PLACEHOLDER};
pub use complexity::{
    extract_space_complexity, extract_time_complexity, Complexity, ComplexityPair,
    DEFAULT_NOTATION, DEFAULT_RATIONALE,
};
pub use dry_run::extract_dry_run;
pub use responses::{
    parse_brute_force, parse_debug, parse_detailed, parse_optimized, parse_standard_solution,
    ParsedApproach,
};
