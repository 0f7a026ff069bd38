//! Ordered Extraction Strategies
//!
//! Each heuristic is a named function tried in order; the first one that
//! yields a value wins. Keeping them separate keeps every heuristic
//! independently testable.

use tracing::trace;

/// A single named extraction heuristic
pub struct ExtractionStrategy<T> {
    pub name: &'static str,
    pub extract: fn(&str) -> Option<T>,
}

impl<T> ExtractionStrategy<T> {
    pub const fn new(name: &'static str, extract: fn(&str) -> Option<T>) -> Self {
        Self { name, extract }
    }
}

/// Run `strategies` in order and return the first hit with its strategy name
pub fn first_match<T>(
    strategies: &[ExtractionStrategy<T>],
    text: &str,
) -> Option<(&'static str, T)> {
    strategies.iter().find_map(|strategy| {
        let value = (strategy.extract)(text)?;
        trace!(strategy = strategy.name, "extraction strategy matched");
        Some((strategy.name, value))
    })
}
