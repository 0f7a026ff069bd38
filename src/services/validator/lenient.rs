//! Lenient Four-Quadrant Validation
//!
//! Each section is checked on its own. A missing or mistyped section is
//! replaced by a labeled `Missing: ...` placeholder so the remaining
//! sections still render. Only text that is not a JSON object fails.

use serde_json::{Map, Value};
use tracing::warn;

use super::{parse_json_object, ResponseResult};
use crate::models::{FourQuadrantData, FourQuadrantImplementation};

const SCHEMA: &str = "FourQuadrantData";

/// Text of `key` when it is a non-blank string, otherwise a placeholder
fn section(object: &Map<String, Value>, key: &str, label: &str) -> String {
    match object.get(key) {
        Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
        _ => {
            warn!(schema = SCHEMA, key, "section missing, substituting placeholder");
            format!("Missing: {}.", label)
        }
    }
}

pub fn parse_four_quadrant(raw: &str) -> ResponseResult<FourQuadrantData> {
    let object = parse_json_object(raw, SCHEMA)?;

    let empty = Map::new();
    let implementation = match object.get("optimalSolutionImplementation") {
        Some(Value::Object(inner)) => inner,
        _ => &empty,
    };

    Ok(FourQuadrantData {
        problem_understanding: section(&object, "problemUnderstanding", "Problem Understanding"),
        brute_force_approach: section(&object, "bruteForceApproach", "Brute Force Approach"),
        optimal_solution_pseudocode: section(
            &object,
            "optimalSolutionPseudocode",
            "Optimal Solution Pseudocode",
        ),
        optimal_solution_implementation: FourQuadrantImplementation {
            code: section(implementation, "code", "Code"),
            time_complexity: section(implementation, "timeComplexity", "Time Complexity"),
            space_complexity: section(implementation, "spaceComplexity", "Space Complexity"),
            thinking_process: section(implementation, "thinkingProcess", "Thinking Process"),
        },
    })
}
