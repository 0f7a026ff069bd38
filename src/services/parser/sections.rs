//! Labeled Section Location
//!
//! LLM markdown marks sections in several ways: `### Thoughts`, `**Thoughts:**`,
//! `2. Your Thoughts: ...` or a bare `Thoughts:` line. This module finds the
//! body of a section by label, whatever the marker style, and stops at the
//! next recognizable section boundary.

/// How strictly a label line must be terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// Label must be a heading or be followed by a colon
    Strict,
    /// Any text may follow the label (`Time complexity O(n) because ...`)
    Loose,
}

/// Which lines close a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundaries {
    /// A code fence ends the section (otherwise fenced lines are part of it)
    pub fences: bool,
    /// Any known section label ends the section (otherwise only complexity labels do)
    pub known_labels: bool,
}

impl Boundaries {
    /// Lists and prose: everything is a boundary
    pub const PROSE: Boundaries = Boundaries {
        fences: true,
        known_labels: true,
    };

    /// Complexity rationale: headings, fences and the other complexity label
    pub const COMPLEXITY: Boundaries = Boundaries {
        fences: true,
        known_labels: false,
    };

    /// Traces and tables: only headings and complexity labels end the section
    pub const TRACE: Boundaries = Boundaries {
        fences: false,
        known_labels: false,
    };
}

pub const TIME_COMPLEXITY_LABELS: &[&str] = &["time complexity"];
pub const SPACE_COMPLEXITY_LABELS: &[&str] = &["space complexity"];

/// Labels that open a new section in the response formats we request
const KNOWN_LABELS: &[&str] = &[
    "time complexity",
    "space complexity",
    "your thoughts",
    "thoughts",
    "key insights",
    "reasoning",
    "approach",
    "code",
    "optimized code",
    "optimal solution",
    "optimization analysis",
    "improvements",
    "how to optimize",
    "brute force",
    "dry run",
    "visualization",
    "issues identified",
];

/// Characters that may prefix a label on its line
fn is_marker(c: char) -> bool {
    matches!(c, '#' | '*' | '>' | '-' | '_' | '•') || c.is_whitespace()
}

/// Whether `line` is a markdown heading
pub fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Whether `line` opens or closes a code fence
pub fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Strip list numbering such as `2.` or `3)` from the front of `text`
fn strip_numbering(text: &str) -> &str {
    let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return text;
    }
    match text[digits..].chars().next() {
        Some('.') | Some(')') => &text[digits + 1..],
        _ => text,
    }
}

/// Match `line` against `labels`; returns the text following the label.
///
/// Labels must be lowercase ASCII and are compared case-insensitively.
pub fn match_label<'a>(line: &'a str, labels: &[&str], style: LabelStyle) -> Option<&'a str> {
    let heading = is_heading(line);
    let text = line.trim_start_matches(is_marker);
    let text = strip_numbering(text).trim_start_matches(is_marker);

    labels.iter().find_map(|label| {
        let head = text.get(..label.len())?;
        if !head.eq_ignore_ascii_case(label) {
            return None;
        }
        let after = &text[label.len()..];
        if after.chars().next().is_some_and(|c| c.is_alphanumeric()) {
            return None;
        }

        let after = after.trim_start_matches(|c: char| c == '*' || c.is_whitespace());
        if let Some(rest) = after.strip_prefix(':') {
            return Some(rest.trim_start_matches(|c: char| c == '*' || c.is_whitespace()));
        }
        if heading || after.trim().is_empty() {
            return Some("");
        }
        match style {
            LabelStyle::Loose => Some(after),
            LabelStyle::Strict => None,
        }
    })
}

fn is_boundary(line: &str, boundaries: Boundaries) -> bool {
    if is_heading(line) {
        return true;
    }
    if boundaries.fences && is_fence(line) {
        return true;
    }
    if match_label(line, TIME_COMPLEXITY_LABELS, LabelStyle::Loose).is_some()
        || match_label(line, SPACE_COMPLEXITY_LABELS, LabelStyle::Loose).is_some()
    {
        return true;
    }
    // `- Approach: iterate` inside a list is an item, not a new section
    boundaries.known_labels
        && !is_list_item(line)
        && match_label(line, KNOWN_LABELS, LabelStyle::Strict).is_some()
}

fn is_list_item(line: &str) -> bool {
    let trimmed = line.trim_start();
    ["- ", "* ", "• "].iter().any(|marker| trimmed.starts_with(marker))
}

/// Body of the first section opened by one of `labels`.
///
/// The body starts with whatever follows the label on its own line and runs
/// until the next boundary line. Returns `None` when no label matches or the
/// body is blank.
pub fn find_section(
    text: &str,
    labels: &[&str],
    style: LabelStyle,
    boundaries: Boundaries,
) -> Option<String> {
    let mut lines = text.lines();
    let first = loop {
        let line = lines.next()?;
        if let Some(rest) = match_label(line, labels, style) {
            break rest;
        }
    };

    collect_body(first, lines, boundaries)
}

/// `first` plus every following line up to the next boundary, trimmed
pub fn collect_body<'a>(
    first: &'a str,
    lines: impl Iterator<Item = &'a str>,
    boundaries: Boundaries,
) -> Option<String> {
    let mut body = vec![first];
    let mut in_fence = is_fence(first);
    for line in lines {
        if !in_fence && is_boundary(line, boundaries) {
            break;
        }
        if is_fence(line) {
            in_fence = !in_fence;
        }
        body.push(line);
    }

    let body = body.join("\n").trim().to_string();
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}
