//! Dry-Run Extraction
//!
//! A missing walkthrough stays `None`. Callers must be able to tell
//! "not provided" apart from an empty trace, so there is no placeholder.

use regex::Regex;
use std::sync::LazyLock;

use super::sections::{collect_body, find_section, Boundaries, LabelStyle};
use super::strategy::{first_match, ExtractionStrategy};

/// Section labels for a walkthrough, combined forms first
const DRY_RUN_LABELS: &[&str] = &[
    "dry run & visualization",
    "dry run and visualization",
    "dry run",
    "visualization",
    "walk-through",
    "walkthrough",
    "trace",
];

static NARRATIVE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)step[ \t]+by[ \t]+step|walkthrough|following the execution")
        .expect("Invalid dry run phrase regex")
});

const DRY_RUN_STRATEGIES: &[ExtractionStrategy<String>] = &[
    ExtractionStrategy::new("labeled_section", labeled_section),
    ExtractionStrategy::new("narrative_phrase", narrative_phrase),
];

fn labeled_section(text: &str) -> Option<String> {
    find_section(text, DRY_RUN_LABELS, LabelStyle::Strict, Boundaries::TRACE)
}

/// From the first narrative cue to the next complexity label
fn narrative_phrase(text: &str) -> Option<String> {
    let found = NARRATIVE_PHRASE.find(text)?;
    let mut lines = text[found.start()..].lines();
    let first = lines.next()?;
    collect_body(first, lines, Boundaries::TRACE)
}

/// Extract a dry run; `None` when the response has none
pub fn extract_dry_run(text: &str) -> Option<String> {
    first_match(DRY_RUN_STRATEGIES, text).map(|(_, trace)| trace)
}
