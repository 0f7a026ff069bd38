//! Bullet and Thought Extraction

use regex::Regex;
use std::sync::LazyLock;

use super::sections::{find_section, Boundaries, LabelStyle};

/// Single thought returned when a response offers none
pub const THOUGHTS_PLACEHOLDER: &str = "Solution approach based on efficiency and readability";

/// Section labels that introduce the reasoning list
pub const THOUGHT_LABELS: &[&str] = &[
    "your thoughts",
    "thoughts",
    "key insights",
    "reasoning",
    "approach",
];

/// `-`, `*`, `•`, `1.` or `1)` followed by whitespace
static BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+(.*)$").expect("Invalid bullet regex")
});

/// Contents of every bullet line in `text`, markers stripped
pub fn bullet_items(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| BULLET.captures(line))
        .filter_map(|captures| captures.get(1))
        .map(|item| item.as_str().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Items of a list section: bullet contents when any line is a bullet,
/// otherwise every non-empty line
pub fn list_items(section: &str) -> Vec<String> {
    let bullets = bullet_items(section);
    if !bullets.is_empty() {
        return bullets;
    }

    section
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Items of the first section labeled by one of `labels`; empty when absent
pub fn extract_list(text: &str, labels: &[&str]) -> Vec<String> {
    find_section(text, labels, LabelStyle::Strict, Boundaries::PROSE)
        .map(|section| list_items(&section))
        .unwrap_or_default()
}

/// Reasoning bullets of a response. Always at least one element.
pub fn extract_thoughts(text: &str) -> Vec<String> {
    let thoughts = extract_list(text, THOUGHT_LABELS);
    if thoughts.is_empty() {
        vec![THOUGHTS_PLACEHOLDER.to_string()]
    } else {
        thoughts
    }
}
