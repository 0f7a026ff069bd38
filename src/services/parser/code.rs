//! Code Block Extraction

use regex::Regex;
use std::sync::LazyLock;

use super::strategy::{first_match, ExtractionStrategy};

/// Returned only when the response itself is blank
pub const NO_CODE_PLACEHOLDER: &str = "// No code found in response";

/// First fenced block: three backticks, optional language tag, lazily up to the closing fence
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+#.\-]*[ \t]*\r?\n?(.*?)```").expect("Invalid code fence regex")
});

const CODE_STRATEGIES: &[ExtractionStrategy<String>] = &[
    ExtractionStrategy::new("fenced_block", fenced_block),
    ExtractionStrategy::new("raw_text", raw_text),
];

/// Contents of the first non-empty fenced code block, if any
pub fn fenced_block(text: &str) -> Option<String> {
    let captures = FENCED_BLOCK.captures(text)?;
    let code = captures.get(1)?.as_str().trim_end();
    let code = code.trim_start_matches(['\r', '\n']);
    if code.trim().is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}

/// The whole response, for models that answer without fences
fn raw_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Extract code from a response. Never returns an empty string.
pub fn extract_code(text: &str) -> String {
    first_match(CODE_STRATEGIES, text)
        .map(|(_, code)| code)
        .unwrap_or_else(|| NO_CODE_PLACEHOLDER.to_string())
}
