//! Behavioral Story Library
//!
//! Leadership principles and pre-written STAR stories, loaded once from the
//! JSON files in the data directory.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::models::{AppConfig, BehavioralStory, LeadershipPrinciple};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::data_dir;

/// Leadership principles file name
pub const PRINCIPLES_FILE: &str = "amazon_lps.json";

/// Story outlines file name
pub const STORIES_FILE: &str = "behavioral_stories.json";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryLibrary {
    principles: Vec<LeadershipPrinciple>,
    stories: Vec<BehavioralStory>,
}

impl StoryLibrary {
    pub fn new(principles: Vec<LeadershipPrinciple>, stories: Vec<BehavioralStory>) -> Self {
        Self {
            principles,
            stories,
        }
    }

    /// Load from `config.data_dir`, or ~/.interview-assist/data/ when unset
    pub fn for_config(config: &AppConfig) -> AppResult<Self> {
        match &config.data_dir {
            Some(dir) => Self::load(dir),
            None => Self::load(&data_dir()?),
        }
    }

    /// Load both files from `dir`
    pub fn load(dir: &Path) -> AppResult<Self> {
        let principles: Vec<LeadershipPrinciple> =
            read_json(&dir.join(PRINCIPLES_FILE), "Leadership Principles")?;
        let stories: Vec<BehavioralStory> = read_json(&dir.join(STORIES_FILE), "behavioral stories")?;
        info!(
            dir = %dir.display(),
            principles = principles.len(),
            stories = stories.len(),
            "loaded behavioral data"
        );
        Ok(Self::new(principles, stories))
    }

    pub fn principles(&self) -> &[LeadershipPrinciple] {
        &self.principles
    }

    pub fn stories(&self) -> &[BehavioralStory] {
        &self.stories
    }

    pub fn find_story(&self, id: &str) -> Option<&BehavioralStory> {
        self.stories.iter().find(|story| story.id == id)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> AppResult<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::config(format!(
            "Failed to load {} data from {}: {}",
            what,
            path.display(),
            e
        ))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        AppError::config(format!(
            "Failed to parse {} data in {}: {}",
            what,
            path.display(),
            e
        ))
    })
}
