//! Structured JSON Response Validator
//!
//! Turns an LLM response that was asked to be a single JSON value (possibly
//! wrapped in markdown fences) into a typed record or a [`ResponseError`]
//! naming the expected schema. Two policies exist:
//!
//! - strict ([`schemas`]): a missing or mistyped required key is an error
//! - lenient ([`lenient`]): bad sections become labeled placeholders
//!
//! Both policies reject text that is not a JSON object (or array, where an
//! array is expected) outright.

pub mod lenient;
pub mod schemas;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

pub use lenient::parse_four_quadrant;
pub use schemas::{
    parse_anticipated_follow_ups, parse_behavioral_explanation, parse_follow_up,
    parse_generated_story, parse_initial_analysis, parse_narrative_solution,
    parse_principle_list, parse_problem_info, parse_refined_understanding,
    parse_story_selection,
};

/// Characters of raw response kept in an error for diagnostics
const EXCERPT_LEN: usize = 200;

/// Why a structured response could not be used
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseError {
    /// The stripped text is not delimited like the expected JSON value
    #[error("Failed to parse JSON for {schema}: response is not a valid JSON {expected} (got: {excerpt})")]
    NotJsonObject {
        schema: &'static str,
        expected: &'static str,
        excerpt: String,
    },

    /// The text looked like JSON but did not parse
    #[error("Failed to parse JSON for {schema}: {message} (got: {excerpt})")]
    InvalidJson {
        schema: &'static str,
        message: String,
        excerpt: String,
    },

    /// Valid JSON without the required keys or types
    #[error("Response does not match the expected {schema} structure: {message}")]
    SchemaMismatch {
        schema: &'static str,
        message: String,
        excerpt: String,
    },
}

impl ResponseError {
    /// Name of the structure the response was validated against
    pub fn schema(&self) -> &'static str {
        match self {
            ResponseError::NotJsonObject { schema, .. }
            | ResponseError::InvalidJson { schema, .. }
            | ResponseError::SchemaMismatch { schema, .. } => schema,
        }
    }

    /// Truncated raw text that failed validation
    pub fn excerpt(&self) -> &str {
        match self {
            ResponseError::NotJsonObject { excerpt, .. }
            | ResponseError::InvalidJson { excerpt, .. }
            | ResponseError::SchemaMismatch { excerpt, .. } => excerpt,
        }
    }

    pub(crate) fn mismatch(schema: &'static str, message: impl Into<String>, raw: &str) -> Self {
        ResponseError::SchemaMismatch {
            schema,
            message: message.into(),
            excerpt: excerpt(raw),
        }
    }
}

/// Result type for response validation
pub type ResponseResult<T> = Result<T, ResponseError>;

/// First [`EXCERPT_LEN`] characters of `raw`
pub fn excerpt(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.char_indices().nth(EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Remove a leading ```` ```json ```` / ```` ``` ```` fence and a trailing ```` ``` ````
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        text = rest[tag_len..].trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text
}

fn parse_delimited(
    raw: &str,
    schema: &'static str,
    open: char,
    close: char,
    expected: &'static str,
) -> ResponseResult<Value> {
    let text = strip_fences(raw);
    if !text.starts_with(open) || !text.ends_with(close) {
        debug!(schema, excerpt = %excerpt(raw), "response is not delimited JSON");
        return Err(ResponseError::NotJsonObject {
            schema,
            expected,
            excerpt: excerpt(raw),
        });
    }
    serde_json::from_str(text).map_err(|e| ResponseError::InvalidJson {
        schema,
        message: e.to_string(),
        excerpt: excerpt(raw),
    })
}

/// Strip fences and parse a JSON object
pub fn parse_json_object(raw: &str, schema: &'static str) -> ResponseResult<Map<String, Value>> {
    match parse_delimited(raw, schema, '{', '}', "object")? {
        Value::Object(map) => Ok(map),
        _ => Err(ResponseError::NotJsonObject {
            schema,
            expected: "object",
            excerpt: excerpt(raw),
        }),
    }
}

/// Strip fences and parse a JSON array
pub fn parse_json_array(raw: &str, schema: &'static str) -> ResponseResult<Vec<Value>> {
    match parse_delimited(raw, schema, '[', ']', "array")? {
        Value::Array(items) => Ok(items),
        _ => Err(ResponseError::NotJsonObject {
            schema,
            expected: "array",
            excerpt: excerpt(raw),
        }),
    }
}

/// Deserialize an already-parsed value, reporting serde's complaint as a mismatch
pub(crate) fn from_value<T: DeserializeOwned>(
    value: Value,
    schema: &'static str,
    raw: &str,
) -> ResponseResult<T> {
    serde_json::from_value(value).map_err(|e| ResponseError::mismatch(schema, e.to_string(), raw))
}
