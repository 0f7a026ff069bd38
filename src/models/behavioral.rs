//! Behavioral Interview Models
//!
//! Leadership principles, pre-authored STAR stories and the answers the
//! behavioral assistant builds from them.

use serde::{Deserialize, Serialize};

/// A leadership principle from amazon_lps.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadershipPrinciple {
    pub name: String,
    pub description: String,
}

/// A pre-written story in STAR form from behavioral_stories.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralStory {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub principles: Vec<String>,
    pub situation: String,
    pub task: String,
    pub action: String,
    pub result: String,
}

impl BehavioralStory {
    /// Plain-text STAR block embedded in prompts
    pub fn star_context(&self) -> String {
        format!(
            "Story ID: {}\nTitle: {}\nRelevant LPs: {}\nSituation: {}\nTask: {}\nAction: {}\nResult: {}",
            self.id,
            self.title,
            self.principles.join(", "),
            self.situation,
            self.task,
            self.action,
            self.result
        )
    }
}

/// Result of matching a question to a story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralAnswer {
    /// Principles the question targets
    pub principles: Vec<String>,
    /// The chosen story, if one fit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_story: Option<BehavioralStory>,
    /// Why the story was (or was not) chosen
    pub reasoning: String,
}

/// The model's pick among the candidate stories
#[derive(Debug, Clone, PartialEq)]
pub struct StorySelection {
    /// Story id as returned (numbers are stringified); `None` if nothing fit
    pub story_id: Option<String>,
    pub reasoning: String,
}

/// A likely interviewer follow-up with a prepared answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnticipatedFollowUp {
    pub question: String,
    pub answer: String,
}
