//! Problem Models
//!
//! What the extraction and understanding steps produce from screenshots.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Problem details extracted from screenshots.
///
/// Every field is optional because extraction is best effort; later stages
/// substitute "Not specified" style defaults when rendering prompts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_statement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_output: Option<String>,
}

impl ProblemInfo {
    /// Problem statement, or `default` when extraction found none
    pub fn statement_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_blank(&self.problem_statement).unwrap_or(default)
    }

    /// Constraints, or `default`
    pub fn constraints_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_blank(&self.constraints).unwrap_or(default)
    }

    /// Example input, or `default`
    pub fn example_input_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_blank(&self.example_input).unwrap_or(default)
    }

    /// Example output, or `default`
    pub fn example_output_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_blank(&self.example_output).unwrap_or(default)
    }

    /// The single example carried by the screenshots themselves
    pub fn extracted_example(&self) -> ProblemExample {
        ProblemExample {
            input: self.example_input_or("N/A").to_string(),
            output: self.example_output_or("N/A").to_string(),
            explanation: None,
        }
    }

    /// Pretty JSON for embedding in prompts
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// One input/output example.
///
/// Models often answer `"output": -10` or `"input": [1, 2]`; non-string
/// values are kept as their compact JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemExample {
    #[serde(default, deserialize_with = "example_text")]
    pub input: String,
    #[serde(default, deserialize_with = "example_text")]
    pub output: String,
    #[serde(
        default,
        deserialize_with = "optional_example_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub explanation: Option<String>,
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn example_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn optional_example_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(value_text(Value::deserialize(deserializer)?))
}

/// The model's restatement of the problem, awaiting user confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemUnderstandingData {
    pub understanding_statement: String,
    pub generated_examples: Vec<ProblemExample>,
    pub clarifying_questions: Vec<String>,
}

/// Outcome of the understanding step
#[derive(Debug, Clone, PartialEq)]
pub enum InitialAnalysis {
    /// The screenshots already contained usable examples
    ExamplesPresent,
    /// Understanding and examples were generated and need confirmation
    Understanding(ProblemUnderstandingData),
}

/// Understanding and examples frozen as solution inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedUnderstanding {
    pub understanding: String,
    pub examples: Vec<ProblemExample>,
}

impl ConfirmedUnderstanding {
    /// Skip-confirmation path: the extracted fields stand in for both
    pub fn from_extraction(info: &ProblemInfo) -> Self {
        Self {
            understanding: info.statement_or("Extracted directly").to_string(),
            examples: vec![info.extracted_example()],
        }
    }

    /// User-confirmed (possibly refined) understanding
    pub fn from_understanding(data: &ProblemUnderstandingData) -> Self {
        Self {
            understanding: data.understanding_statement.clone(),
            examples: data.generated_examples.clone(),
        }
    }
}
