//! Complexity Extraction
//!
//! Finds the "Time complexity" / "Space complexity" passages of a response,
//! isolates the `O(...)` notation and keeps the rest as the rationale. Both
//! fields always resolve: a missing label or notation degrades to `O(n)`.

use regex::Regex;
use std::sync::LazyLock;

use super::sections::{
    find_section, Boundaries, LabelStyle, SPACE_COMPLEXITY_LABELS, TIME_COMPLEXITY_LABELS,
};
use super::strategy::{first_match, ExtractionStrategy};

/// Notation used when a response gives none
pub const DEFAULT_NOTATION: &str = "O(n)";

/// Rationale used when a response explains neither complexity
pub const DEFAULT_RATIONALE: &str = "Explanation not found in response";

static INLINE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btime\s+complexity\b[ \t]*(?:is|of|:)?[ \t]*([^\n]*)")
        .expect("Invalid time complexity regex")
});

static INLINE_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bspace\s+complexity\b[ \t]*(?:is|of|:)?[ \t]*([^\n]*)")
        .expect("Invalid space complexity regex")
});

/// One complexity figure: the notation plus whatever explained it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complexity {
    pub notation: String,
    pub rationale: Option<String>,
}

impl Complexity {
    /// The documented default for an absent figure
    pub fn unknown() -> Self {
        Self {
            notation: DEFAULT_NOTATION.to_string(),
            rationale: None,
        }
    }

    /// Split a captured passage into notation and rationale
    fn from_passage(passage: &str) -> Self {
        let passage = passage.trim();
        let passage = passage
            .strip_prefix("is ")
            .or_else(|| passage.strip_prefix("Is "))
            .unwrap_or(passage);

        match find_notation(passage) {
            Some((start, end)) => {
                let rest = format!("{} {}", &passage[..start], &passage[end..]);
                Self {
                    notation: passage[start..end].to_string(),
                    rationale: clean_rationale(&rest),
                }
            }
            None => Self {
                notation: DEFAULT_NOTATION.to_string(),
                rationale: clean_rationale(passage),
            },
        }
    }

    /// `O(n) - rationale`, or just the notation when nothing explained it
    pub fn display(&self) -> String {
        match &self.rationale {
            Some(rationale) => format!("{} - {}", self.notation, rationale),
            None => self.notation.clone(),
        }
    }
}

/// Time and space complexity of one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexityPair {
    pub time: Complexity,
    pub space: Complexity,
}

impl ComplexityPair {
    pub fn extract(text: &str) -> Self {
        Self {
            time: extract_time_complexity(text),
            space: extract_space_complexity(text),
        }
    }

    /// Combined rationale, never empty
    pub fn rationale(&self) -> String {
        match (&self.time.rationale, &self.space.rationale) {
            (Some(time), Some(space)) if time != space => format!("{}\n{}", time, space),
            (Some(time), _) => time.clone(),
            (None, Some(space)) => space.clone(),
            (None, None) => DEFAULT_RATIONALE.to_string(),
        }
    }
}

// ============================================================================
// Strategies
// ============================================================================

const TIME_STRATEGIES: &[ExtractionStrategy<String>] = &[
    ExtractionStrategy::new("labeled_line", labeled_time),
    ExtractionStrategy::new("inline_mention", inline_time),
];

const SPACE_STRATEGIES: &[ExtractionStrategy<String>] = &[
    ExtractionStrategy::new("labeled_line", labeled_space),
    ExtractionStrategy::new("inline_mention", inline_space),
];

fn labeled_time(text: &str) -> Option<String> {
    find_section(
        text,
        TIME_COMPLEXITY_LABELS,
        LabelStyle::Loose,
        Boundaries::COMPLEXITY,
    )
}

fn labeled_space(text: &str) -> Option<String> {
    find_section(
        text,
        SPACE_COMPLEXITY_LABELS,
        LabelStyle::Loose,
        Boundaries::COMPLEXITY,
    )
}

fn inline(regex: &Regex, text: &str) -> Option<String> {
    let captured = regex.captures(text)?.get(1)?.as_str().trim();
    (!captured.is_empty()).then(|| captured.to_string())
}

fn inline_time(text: &str) -> Option<String> {
    inline(&INLINE_TIME, text)
}

fn inline_space(text: &str) -> Option<String> {
    inline(&INLINE_SPACE, text)
}

pub fn extract_time_complexity(text: &str) -> Complexity {
    first_match(TIME_STRATEGIES, text)
        .map(|(_, passage)| Complexity::from_passage(&passage))
        .unwrap_or_else(Complexity::unknown)
}

pub fn extract_space_complexity(text: &str) -> Complexity {
    first_match(SPACE_STRATEGIES, text)
        .map(|(_, passage)| Complexity::from_passage(&passage))
        .unwrap_or_else(Complexity::unknown)
}

// ============================================================================
// Notation scanning
// ============================================================================

/// Byte range of the first balanced `O(...)` in `text`.
///
/// Nested parentheses are allowed (`O(n * (m + k))`). An `O` glued to a
/// preceding word (`LOG(`) does not count.
fn find_notation(text: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find(['O', 'o']) {
        let start = search_from + offset;
        search_from = start + 1;

        if bytes.get(start + 1) != Some(&b'(') {
            continue;
        }
        let glued = text[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if glued {
            continue;
        }

        let mut depth = 0usize;
        for (i, b) in bytes.iter().enumerate().skip(start + 1) {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some((start, i + 1));
                    }
                }
                b'\n' => break,
                _ => {}
            }
        }
    }
    None
}

fn clean_rationale(rest: &str) -> Option<String> {
    let separators = |c: char| {
        c.is_whitespace() || matches!(c, '-' | ':' | ',' | '.' | '*' | '`' | '–' | '—')
    };
    let cleaned = rest
        .trim_start_matches(separators)
        .trim_end_matches(|c: char| c.is_whitespace() || c == '*' || c == '`');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_complexities() {
        let text = "Code above.\n\nTime complexity: O(n) - single pass over the array.\n\
                    Space complexity: O(n) - the hash map stores up to n entries.";
        let pair = ComplexityPair::extract(text);
        assert_eq!(pair.time.notation, "O(n)");
        assert_eq!(
            pair.time.rationale.as_deref(),
            Some("single pass over the array.")
        );
        assert_eq!(pair.space.notation, "O(n)");
        assert_eq!(
            pair.space.display(),
            "O(n) - the hash map stores up to n entries."
        );
    }

    #[test]
    fn test_heading_form_with_following_lines() {
        let text = "### Time Complexity\n**O(n log n)** because of sorting.\n\n\
                    ### Space Complexity\nO(1) extra.";
        let pair = ComplexityPair::extract(text);
        assert_eq!(pair.time.notation, "O(n log n)");
        assert_eq!(pair.time.rationale.as_deref(), Some("because of sorting."));
        assert_eq!(pair.space.notation, "O(1)");
        assert_eq!(pair.space.rationale.as_deref(), Some("extra."));
    }

    #[test]
    fn test_nested_parentheses() {
        let time = extract_time_complexity("Time complexity: O(n * (m + k)) overall");
        assert_eq!(time.notation, "O(n * (m + k))");
        assert_eq!(time.rationale.as_deref(), Some("overall"));
    }

    #[test]
    fn test_missing_notation_keeps_passage_as_rationale() {
        let time = extract_time_complexity("Time complexity: linear in the input size");
        assert_eq!(time.notation, DEFAULT_NOTATION);
        assert_eq!(time.rationale.as_deref(), Some("linear in the input size"));
    }

    #[test]
    fn test_inline_mention() {
        let text = "Overall the time complexity is O(n^2), which is fine for n <= 1000.";
        let time = extract_time_complexity(text);
        assert_eq!(time.notation, "O(n^2)");
        assert_eq!(time.rationale.as_deref(), Some("which is fine for n <= 1000."));
    }

    #[test]
    fn test_no_labels_degrade_to_defaults() {
        let pair = ComplexityPair::extract("Just some code without analysis");
        assert_eq!(pair.time.notation, "O(n)");
        assert_eq!(pair.space.notation, "O(n)");
        assert_eq!(pair.rationale(), DEFAULT_RATIONALE);
        assert_eq!(pair.time.display(), "O(n)");
    }

    #[test]
    fn test_glued_o_is_not_notation() {
        assert_eq!(find_notation("foo(n) then O(1)"), Some((12, 16)));
        assert_eq!(find_notation("O(n"), None);
    }
}
