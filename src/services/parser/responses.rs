//! Response Shapes
//!
//! Builds solution records from markdown responses using the shared
//! extraction primitives. None of these functions fail: every field
//! degrades to its documented default.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::bullets::{bullet_items, extract_list, extract_thoughts};
use super::code::{extract_code, fenced_block};
use super::complexity::ComplexityPair;
use super::dry_run::extract_dry_run;
use crate::models::{
    BasicSolutionData, DebugSolutionData, DetailedSolutionData, DEBUG_COMPLEXITY,
};

const OPTIMIZATION_LABELS: &[&str] = &["optimization analysis", "improvements", "how to optimize"];

/// Code shown when a debug response carries no fenced block
pub const DEBUG_CODE_PLACEHOLDER: &str = "// Debug mode - see analysis below";

/// Thought shown when a debug response has no bullet points
pub const DEBUG_THOUGHTS_PLACEHOLDER: &str = "Debug analysis based on your screenshots";

/// Debug responses surface at most this many bullets as thoughts
const MAX_DEBUG_THOUGHTS: usize = 5;

/// One approach (brute force or optimized) pulled from a markdown response
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedApproach {
    pub code: String,
    pub complexity: ComplexityPair,
    pub dry_run: Option<String>,
    pub analysis: Vec<String>,
}

/// Brute-force response: code, complexities and an optional dry run
pub fn parse_brute_force(text: &str) -> ParsedApproach {
    ParsedApproach {
        code: extract_code(text),
        complexity: ComplexityPair::extract(text),
        dry_run: extract_dry_run(text),
        analysis: Vec::new(),
    }
}

/// Optimized response: as brute force, plus the optimization analysis list
pub fn parse_optimized(text: &str) -> ParsedApproach {
    ParsedApproach {
        analysis: extract_list(text, OPTIMIZATION_LABELS),
        ..parse_brute_force(text)
    }
}

/// Pair the two detailed-mode responses into one record
pub fn parse_detailed(
    problem_statement: &str,
    brute_raw: &str,
    optimized_raw: &str,
) -> DetailedSolutionData {
    let brute = parse_brute_force(brute_raw);
    let optimized = parse_optimized(optimized_raw);

    DetailedSolutionData {
        problem_statement: problem_statement.to_string(),
        brute_force_code: brute.code,
        brute_force_time_complexity: brute.complexity.time.notation.clone(),
        brute_force_space_complexity: brute.complexity.space.notation.clone(),
        brute_force_complexity_rationale: brute.complexity.rationale(),
        brute_force_dry_run_visualization: brute.dry_run,
        optimization_analysis: optimized.analysis,
        optimized_code: optimized.code,
        optimized_time_complexity: optimized.complexity.time.notation.clone(),
        optimized_space_complexity: optimized.complexity.space.notation.clone(),
        optimized_complexity_rationale: optimized.complexity.rationale(),
        optimized_dry_run_visualization: optimized.dry_run,
        raw_brute_force_response: Some(brute_raw.to_string()),
        raw_optimized_response: Some(optimized_raw.to_string()),
    }
}

/// The one-shot markdown answer used by the fallback path
pub fn parse_standard_solution(text: &str) -> BasicSolutionData {
    let complexity = ComplexityPair::extract(text);
    let solution = BasicSolutionData {
        code: extract_code(text),
        thoughts: extract_thoughts(text),
        time_complexity: complexity.time.display(),
        space_complexity: complexity.space.display(),
        dry_run_visualization: extract_dry_run(text),
    };
    debug!(
        thoughts = solution.thoughts.len(),
        has_dry_run = solution.dry_run_visualization.is_some(),
        "parsed standard solution"
    );
    solution
}

// ============================================================================
// Debug responses
// ============================================================================

/// Keyword groups promoted to `##` headings when a debug answer has none
static DEBUG_HEADINGS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)issues identified|problems found|bugs found", "## Issues Identified"),
        (r"(?i)code improvements|improvements|suggested changes", "## Code Improvements"),
        (r"(?i)optimizations|performance improvements", "## Optimizations"),
        (r"(?i)explanation|detailed analysis", "## Explanation"),
    ]
    .into_iter()
    .map(|(pattern, heading)| {
        (
            Regex::new(pattern).expect("Invalid debug heading regex"),
            heading,
        )
    })
    .collect()
});

/// Give an unstructured debug answer markdown headings
fn format_debug_analysis(text: &str) -> String {
    if text.contains("# ") {
        return text.to_string();
    }
    DEBUG_HEADINGS
        .iter()
        .fold(text.to_string(), |formatted, (regex, heading)| {
            regex.replacen(&formatted, 1, *heading).into_owned()
        })
}

/// Debug response over the extra screenshots
pub fn parse_debug(text: &str) -> DebugSolutionData {
    let debug_analysis = format_debug_analysis(text);

    let mut thoughts = bullet_items(&debug_analysis);
    thoughts.truncate(MAX_DEBUG_THOUGHTS);
    if thoughts.is_empty() {
        thoughts.push(DEBUG_THOUGHTS_PLACEHOLDER.to_string());
    }

    DebugSolutionData {
        code: fenced_block(text).unwrap_or_else(|| DEBUG_CODE_PLACEHOLDER.to_string()),
        thoughts,
        time_complexity: DEBUG_COMPLEXITY.to_string(),
        space_complexity: DEBUG_COMPLEXITY.to_string(),
        debug_analysis,
    }
}
