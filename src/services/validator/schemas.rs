//! Strict Schemas
//!
//! One parser per structured call site. A response that is missing a
//! required key, or carries it with the wrong type, is rejected with a
//! [`ResponseError`] naming the structure.

use serde::Deserialize;
use serde_json::Value;

use super::{from_value, parse_json_array, parse_json_object, ResponseError, ResponseResult};
use crate::models::{
    AnticipatedFollowUp, InitialAnalysis, NarrativeSolutionData, OptimalImplementation,
    ProblemInfo, ProblemUnderstandingData, StorySelection,
};

// ============================================================================
// Coding flow
// ============================================================================

/// Extraction output. Field types are coerced rather than enforced because
/// vision models often return constraints as a list.
pub fn parse_problem_info(raw: &str) -> ResponseResult<ProblemInfo> {
    let object = parse_json_object(raw, "ProblemInfo")?;
    let field = |key: &str| object.get(key).and_then(coerce_text);

    Ok(ProblemInfo {
        problem_statement: field("problem_statement"),
        constraints: field("constraints"),
        example_input: field("example_input"),
        example_output: field("example_output"),
    })
}

/// Render a scalar or list as display text; `null` and blanks become `None`
fn coerce_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(coerce_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Understanding step: either the `{"examplesPresent": true}` signal or a
/// full [`ProblemUnderstandingData`]
pub fn parse_initial_analysis(raw: &str) -> ResponseResult<InitialAnalysis> {
    let object = parse_json_object(raw, "ProblemUnderstandingData")?;
    if object.get("examplesPresent") == Some(&Value::Bool(true)) {
        return Ok(InitialAnalysis::ExamplesPresent);
    }
    from_value(Value::Object(object), "ProblemUnderstandingData", raw)
        .map(InitialAnalysis::Understanding)
}

/// Clarification step: always a full [`ProblemUnderstandingData`]
pub fn parse_refined_understanding(raw: &str) -> ResponseResult<ProblemUnderstandingData> {
    let object = parse_json_object(raw, "ProblemUnderstandingData")?;
    from_value(Value::Object(object), "ProblemUnderstandingData", raw)
}

/// Narrative solution. The three approach sections and the final code and
/// dry run are required; prose fields inside a section may be omitted.
pub fn parse_narrative_solution(raw: &str) -> ResponseResult<NarrativeSolutionData> {
    let object = parse_json_object(raw, "NarrativeSolutionData")?;
    let solution: NarrativeSolutionData =
        from_value(Value::Object(object), "NarrativeSolutionData", raw)?;
    if solution.optimal_implementation.code.trim().is_empty() {
        return Err(ResponseError::mismatch(
            "NarrativeSolutionData",
            "optimalImplementation.code is empty",
            raw,
        ));
    }
    Ok(solution)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FollowUpResponse {
    optimal_implementation: OptimalImplementation,
}

/// Follow-up answer: a revised `{code, dryRun}` pair
pub fn parse_follow_up(raw: &str) -> ResponseResult<OptimalImplementation> {
    let object = parse_json_object(raw, "FollowUpResponse")?;
    from_value::<FollowUpResponse>(Value::Object(object), "FollowUpResponse", raw)
        .map(|response| response.optimal_implementation)
}

// ============================================================================
// Behavioral flow
// ============================================================================

/// Leadership principles named by the model: a JSON array of strings
pub fn parse_principle_list(raw: &str) -> ResponseResult<Vec<String>> {
    let items = parse_json_array(raw, "PrincipleList")?;
    from_value(Value::Array(items), "PrincipleList", raw)
}

/// Story choice. `selectedStoryId` must be present; it may be a string, a
/// number or `null`.
pub fn parse_story_selection(raw: &str) -> ResponseResult<StorySelection> {
    const SCHEMA: &str = "StorySelection";
    let object = parse_json_object(raw, SCHEMA)?;

    let story_id = match object.get("selectedStoryId") {
        None => {
            return Err(ResponseError::mismatch(
                SCHEMA,
                "missing field `selectedStoryId`",
                raw,
            ))
        }
        Some(Value::Null) => None,
        Some(Value::String(id)) if id.trim().is_empty() => None,
        Some(Value::String(id)) => Some(id.trim().to_string()),
        Some(Value::Number(id)) => Some(id.to_string()),
        Some(other) => {
            return Err(ResponseError::mismatch(
                SCHEMA,
                format!("selectedStoryId has unexpected type: {}", other),
                raw,
            ))
        }
    };

    let reasoning = match object.get("reasoning") {
        Some(Value::String(reasoning)) => reasoning.clone(),
        _ => {
            return Err(ResponseError::mismatch(
                SCHEMA,
                "reasoning must be a string",
                raw,
            ))
        }
    };

    Ok(StorySelection {
        story_id,
        reasoning,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedStory {
    generated_story_text: String,
}

/// Fallback STAR story written by the model
pub fn parse_generated_story(raw: &str) -> ResponseResult<String> {
    let object = parse_json_object(raw, "GeneratedStory")?;
    from_value::<GeneratedStory>(Value::Object(object), "GeneratedStory", raw)
        .map(|story| story.generated_story_text)
}

/// Likely interviewer follow-ups: a JSON array of `{question, answer}`
pub fn parse_anticipated_follow_ups(raw: &str) -> ResponseResult<Vec<AnticipatedFollowUp>> {
    let items = parse_json_array(raw, "AnticipatedFollowUps")?;
    from_value(Value::Array(items), "AnticipatedFollowUps", raw)
}

#[derive(Deserialize)]
struct BehavioralExplanation {
    explanation: String,
}

/// Answer to a follow-up about a behavioral story
pub fn parse_behavioral_explanation(raw: &str) -> ResponseResult<String> {
    let object = parse_json_object(raw, "BehavioralExplanation")?;
    from_value::<BehavioralExplanation>(Value::Object(object), "BehavioralExplanation", raw)
        .map(|response| response.explanation)
}
