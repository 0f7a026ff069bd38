//! Response Parsing Integration Tests
//!
//! Properties of the markdown extractors and the JSON validators on
//! responses shaped like real model output.

use interview_assist_desktop::services::parser::{
    extract_code, extract_dry_run, extract_space_complexity, extract_time_complexity,
    parse_detailed, parse_standard_solution, DEFAULT_NOTATION, DEFAULT_RATIONALE,
    NO_CODE_PLACEHOLDER,
};
use interview_assist_desktop::services::validator::{
    parse_four_quadrant, parse_initial_analysis, parse_problem_info,
    parse_refined_understanding, ResponseError,
};
use interview_assist_desktop::InitialAnalysis;

use crate::common::*;

// ============================================================================
// Markdown extraction
// ============================================================================

#[test]
fn test_extract_code_is_total() {
    let inputs = [
        "",
        "\n\t ",
        "```",
        "```python\n```",
        "Just prose with no code at all.",
        "```rust\nfn main() {}",
        "unicode: 日本語 ```",
    ];
    for input in inputs {
        let code = extract_code(input);
        assert!(!code.is_empty(), "empty code for {:?}", input);
    }
    assert_eq!(extract_code(""), NO_CODE_PLACEHOLDER);
}

#[test]
fn test_standard_solution_sections() {
    let solution = parse_standard_solution(STANDARD);
    assert_eq!(solution.code, "def two_sum(nums, target):\n    return []");
    assert_eq!(solution.thoughts, vec!["Use a hash map of complements"]);
    assert_eq!(solution.time_complexity, "O(n) - single pass");
    assert_eq!(solution.space_complexity, "O(n) - the map");
    assert!(solution.dry_run_visualization.is_none());
}

#[test]
fn test_missing_complexity_defaults() {
    let text = "```python\nprint('hi')\n```";
    assert_eq!(extract_time_complexity(text).notation, DEFAULT_NOTATION);
    assert_eq!(extract_space_complexity(text).notation, DEFAULT_NOTATION);

    let detailed = parse_detailed("Two Sum", text, text);
    assert_eq!(detailed.brute_force_time_complexity, "O(n)");
    assert_eq!(detailed.brute_force_complexity_rationale, DEFAULT_RATIONALE);
    assert!(!detailed.optimized_complexity_rationale.is_empty());
}

#[test]
fn test_dry_run_absent_is_none() {
    assert_eq!(extract_dry_run(STANDARD), None);

    let with_trace = format!("{}\n\n### Dry Run\ni=0: seen={{2: 0}}\ni=1: found 7", STANDARD);
    let trace = extract_dry_run(&with_trace).unwrap();
    assert!(trace.contains("i=1: found 7"));
}

// ============================================================================
// JSON validation
// ============================================================================

#[test]
fn test_fenced_and_bare_json_parse_alike() {
    let fenced = format!("```json\n{}\n```", TWO_SUM_EXTRACTION);
    let bare = parse_problem_info(TWO_SUM_EXTRACTION).unwrap();
    assert_eq!(parse_problem_info(&fenced).unwrap(), bare);
    assert_eq!(bare.problem_statement.as_deref(), Some("Two Sum"));
}

#[test]
fn test_examples_present_flag() {
    assert_eq!(
        parse_initial_analysis(EXAMPLES_PRESENT).unwrap(),
        InitialAnalysis::ExamplesPresent
    );
    match parse_initial_analysis(UNDERSTANDING).unwrap() {
        InitialAnalysis::Understanding(data) => {
            assert_eq!(data.generated_examples.len(), 1);
            assert_eq!(data.clarifying_questions.len(), 1);
        }
        other => panic!("unexpected analysis: {:?}", other),
    }
}

#[test]
fn test_strict_validation_names_the_structure() {
    let err = parse_refined_understanding(r#"{"understandingStatement": "only this"}"#)
        .unwrap_err();
    assert!(matches!(err, ResponseError::SchemaMismatch { .. }));
    assert_eq!(err.schema(), "ProblemUnderstandingData");
    assert!(err.to_string().contains("ProblemUnderstandingData"));

    let err = parse_problem_info("I could not read the screenshot.").unwrap_err();
    assert!(matches!(err, ResponseError::NotJsonObject { .. }));
    assert!(err.excerpt().starts_with("I could not read"));
}

#[test]
fn test_lenient_four_quadrant_fills_placeholders() {
    let data = parse_four_quadrant(
        r#"{"problemUnderstanding": "Find a pair", "optimalSolutionImplementation": {"code": "seen = {}"}}"#,
    )
    .unwrap();

    assert_eq!(data.problem_understanding, "Find a pair");
    assert_eq!(data.brute_force_approach, "Missing: Brute Force Approach.");
    assert_eq!(data.optimal_solution_implementation.code, "seen = {}");
    assert_eq!(
        data.optimal_solution_implementation.time_complexity,
        "Missing: Time Complexity."
    );

    // Only a non-object response is rejected
    assert!(parse_four_quadrant("{}").is_ok());
    assert!(parse_four_quadrant("[1, 2]").is_err());
}
