//! Solution Models
//!
//! Terminal records produced by the response parsers. Exactly one
//! `SolutionRecord` variant is active per session; the `kind` tag is set by
//! whichever parser built it so renderers switch on the tag.

use serde::{Deserialize, Serialize};

// ============================================================================
// Solution shapes
// ============================================================================

/// One-shot solution parsed from markdown (the fallback shape)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicSolutionData {
    pub code: String,
    pub thoughts: Vec<String>,
    pub time_complexity: String,
    pub space_complexity: String,
    #[serde(
        rename = "dryRunVisualization",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dry_run_visualization: Option<String>,
}

/// Brute force and optimized variants paired from two markdown calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedSolutionData {
    pub problem_statement: String,
    pub brute_force_code: String,
    pub brute_force_time_complexity: String,
    pub brute_force_space_complexity: String,
    pub brute_force_complexity_rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brute_force_dry_run_visualization: Option<String>,
    pub optimization_analysis: Vec<String>,
    pub optimized_code: String,
    pub optimized_time_complexity: String,
    pub optimized_space_complexity: String,
    pub optimized_complexity_rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_dry_run_visualization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_brute_force_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_optimized_response: Option<String>,
}

/// Brute-force section of a narrative solution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BruteForceSection {
    pub explanation: String,
    pub code_or_pseudocode: String,
    pub time_complexity: String,
    pub space_complexity: String,
    pub inefficiency_reason: String,
}

/// Optimization-strategy section of a narrative solution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizationStrategy {
    pub explanation: String,
    pub pseudocode: String,
    pub time_complexity: String,
    pub space_complexity: String,
}

/// Final code plus its dry run; also the unit of follow-up history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalImplementation {
    pub code: String,
    pub dry_run: String,
}

/// Four-section narrative solution (the primary path)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeSolutionData {
    #[serde(default)]
    pub problem_analysis: String,
    pub brute_force: BruteForceSection,
    pub optimization_strategy: OptimizationStrategy,
    pub optimal_implementation: OptimalImplementation,
}

/// Implementation block of a four-quadrant solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FourQuadrantImplementation {
    pub code: String,
    pub time_complexity: String,
    pub space_complexity: String,
    pub thinking_process: String,
}

/// Four independently-defaulted sections from one JSON call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FourQuadrantData {
    pub problem_understanding: String,
    pub brute_force_approach: String,
    pub optimal_solution_pseudocode: String,
    pub optimal_solution_implementation: FourQuadrantImplementation,
}

/// A finished solution, tagged by the parser that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SolutionRecord {
    Basic(BasicSolutionData),
    Detailed(DetailedSolutionData),
    Narrative(NarrativeSolutionData),
    FourQuadrant(FourQuadrantData),
}

impl SolutionRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            SolutionRecord::Basic(_) => "basic",
            SolutionRecord::Detailed(_) => "detailed",
            SolutionRecord::Narrative(_) => "narrative",
            SolutionRecord::FourQuadrant(_) => "four_quadrant",
        }
    }

    /// The code and walkthrough that seed the follow-up history
    pub fn optimal_implementation(&self) -> OptimalImplementation {
        match self {
            SolutionRecord::Basic(basic) => OptimalImplementation {
                code: basic.code.clone(),
                dry_run: basic.dry_run_visualization.clone().unwrap_or_default(),
            },
            SolutionRecord::Detailed(detailed) => OptimalImplementation {
                code: detailed.optimized_code.clone(),
                dry_run: detailed
                    .optimized_dry_run_visualization
                    .clone()
                    .unwrap_or_default(),
            },
            SolutionRecord::Narrative(narrative) => narrative.optimal_implementation.clone(),
            SolutionRecord::FourQuadrant(quadrant) => OptimalImplementation {
                code: quadrant.optimal_solution_implementation.code.clone(),
                dry_run: quadrant.optimal_solution_implementation.thinking_process.clone(),
            },
        }
    }

    /// Problem restatement carried by the record, if the shape has one
    pub fn problem_analysis(&self) -> Option<&str> {
        let analysis = match self {
            SolutionRecord::Basic(_) => return None,
            SolutionRecord::Detailed(detailed) => detailed.problem_statement.as_str(),
            SolutionRecord::Narrative(narrative) => narrative.problem_analysis.as_str(),
            SolutionRecord::FourQuadrant(quadrant) => quadrant.problem_understanding.as_str(),
        };
        if analysis.trim().is_empty() {
            None
        } else {
            Some(analysis)
        }
    }
}

// ============================================================================
// Debug and follow-up
// ============================================================================

/// Result of the debug pipeline over extra screenshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugSolutionData {
    pub code: String,
    pub thoughts: Vec<String>,
    pub time_complexity: String,
    pub space_complexity: String,
    pub debug_analysis: String,
}

/// Complexity placeholder shown for debug results
pub const DEBUG_COMPLEXITY: &str = "N/A - Debug mode";

/// Ordered revisions of the optimal implementation.
///
/// Entry 0 is the original solution. Follow-ups only ever append; there is
/// no API to replace or remove an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationHistory {
    entries: Vec<OptimalImplementation>,
}

impl ImplementationHistory {
    pub fn new(original: OptimalImplementation) -> Self {
        Self {
            entries: vec![original],
        }
    }

    pub fn push(&mut self, revision: OptimalImplementation) {
        self.entries.push(revision);
    }

    pub fn original(&self) -> &OptimalImplementation {
        &self.entries[0]
    }

    pub fn latest(&self) -> &OptimalImplementation {
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[OptimalImplementation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
