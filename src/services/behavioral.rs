//! Behavioral Assistant
//!
//! Answers behavioral interview questions from the story library:
//! principle extraction, story selection, follow-ups about the chosen story,
//! anticipated interviewer probes, generated stories when nothing fits and
//! first-person expansions of a stored outline.
//!
//! Selection degrades instead of failing: a broken selection response yields
//! an answer with no story and the reason in `reasoning`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use interview_assist_core::ProgressSink;
use interview_assist_llm::{CompletionClient, CompletionRequest};

use crate::models::{AnticipatedFollowUp, BehavioralAnswer, BehavioralStory};
use crate::services::prompts::{self, PromptPair};
use crate::services::validator::{
    parse_anticipated_follow_ups, parse_behavioral_explanation, parse_generated_story,
    parse_principle_list, parse_story_selection,
};
use crate::storage::stories::StoryLibrary;
use crate::utils::error::{AppError, AppResult};

#[derive(Clone)]
pub struct BehavioralAssistant {
    client: Arc<dyn CompletionClient>,
    library: Arc<StoryLibrary>,
}

impl BehavioralAssistant {
    pub fn new(client: Arc<dyn CompletionClient>, library: Arc<StoryLibrary>) -> Self {
        Self { client, library }
    }

    pub fn library(&self) -> &StoryLibrary {
        &self.library
    }

    async fn call(&self, pair: PromptPair, token: &CancellationToken) -> AppResult<String> {
        let raw = self
            .client
            .complete(CompletionRequest::new(pair.prompt, pair.system_prompt), token)
            .await?;
        debug!(chars = raw.len(), "received behavioral completion");
        Ok(raw)
    }

    /// Match `question` to the principles it targets and the best story.
    pub async fn answer_question(
        &self,
        question: &str,
        progress: &dyn ProgressSink,
        token: &CancellationToken,
    ) -> AppResult<BehavioralAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::validation("Behavioral question cannot be empty"));
        }

        progress.notify("Loading behavioral data...", 10);
        let principles = self.library.principles();
        if principles.is_empty() {
            return Err(AppError::config("No Leadership Principles loaded"));
        }

        progress.notify("Analyzing question for relevant principles...", 30);
        let extracted = self
            .call(prompts::principle_extraction_prompt(question, principles), token)
            .await
            .and_then(|raw| parse_principle_list(&raw).map_err(AppError::from))
            .map_err(|e| {
                if e.is_cancelled() {
                    AppError::Cancelled
                } else {
                    AppError::internal(format!("Failed during LP extraction: {}", e))
                }
            })?;

        let targeted = if extracted.is_empty() {
            // Nothing matched: answer with the first principle
            warn!("no principles extracted, defaulting to the first one");
            vec![principles[0].name.clone()]
        } else {
            extracted
        };
        info!(principles = ?targeted, "principles extracted");

        progress.notify("Selecting relevant story...", 60);
        let answer = self.select_story(question, targeted, token).await?;

        let done = if answer.selected_story.is_some() {
            "Story selection complete."
        } else {
            "No suitable story found."
        };
        progress.notify(done, 100);
        Ok(answer)
    }

    async fn select_story(
        &self,
        question: &str,
        principles: Vec<String>,
        token: &CancellationToken,
    ) -> AppResult<BehavioralAnswer> {
        let stories = self.library.stories();
        if stories.is_empty() {
            return Ok(BehavioralAnswer {
                principles,
                selected_story: None,
                reasoning: "No stories available to select from.".to_string(),
            });
        }

        let selection = match self
            .call(prompts::story_selection_prompt(question, &principles, stories), token)
            .await
            .and_then(|raw| parse_story_selection(&raw).map_err(AppError::from))
        {
            Ok(selection) => selection,
            Err(e) if e.is_cancelled() => return Err(AppError::Cancelled),
            Err(e) => {
                warn!(error = %e, "story selection failed");
                return Ok(BehavioralAnswer {
                    principles,
                    selected_story: None,
                    reasoning: format!("Error during selection: {}.", e),
                });
            }
        };

        let mut reasoning = selection.reasoning;
        let selected_story = match selection.story_id.as_deref() {
            None => None,
            Some(id) => match self.library.find_story(id) {
                Some(story) => Some(story.clone()),
                None => {
                    warn!(story_id = id, "model selected an unknown story");
                    reasoning.push_str(" (Error: Selected story ID not found internally)");
                    None
                }
            },
        };

        Ok(BehavioralAnswer {
            principles,
            selected_story,
            reasoning,
        })
    }

    /// Answer a follow-up question about the story chosen for `original_question`
    pub async fn follow_up(
        &self,
        original_question: &str,
        story: &BehavioralStory,
        follow_up: &str,
        token: &CancellationToken,
    ) -> AppResult<String> {
        if follow_up.trim().is_empty() {
            return Err(AppError::validation("Follow-up question cannot be empty"));
        }
        let raw = self
            .call(
                prompts::behavioral_follow_up_prompt(original_question, story, follow_up),
                token,
            )
            .await?;
        Ok(parse_behavioral_explanation(&raw)?)
    }

    pub async fn anticipate_follow_ups(
        &self,
        question: &str,
        story: &BehavioralStory,
        token: &CancellationToken,
    ) -> AppResult<Vec<AnticipatedFollowUp>> {
        let raw = self
            .call(prompts::anticipated_follow_ups_prompt(question, story), token)
            .await?;
        Ok(parse_anticipated_follow_ups(&raw)?)
    }

    /// Write a new STAR story when the library has none that fits
    pub async fn generate_story(
        &self,
        question: &str,
        principles: &[String],
        token: &CancellationToken,
    ) -> AppResult<String> {
        let raw = self
            .call(prompts::story_generation_prompt(question, principles), token)
            .await?;
        Ok(parse_generated_story(&raw)?)
    }

    /// Expand a stored outline into first-person markdown.
    ///
    /// An unknown id fails without calling the model.
    pub async fn story_detail(
        &self,
        story_id: &str,
        progress: &dyn ProgressSink,
        token: &CancellationToken,
    ) -> AppResult<String> {
        let story = self
            .library
            .find_story(story_id)
            .ok_or_else(|| AppError::not_found(format!("Story with ID {} not found", story_id)))?;

        progress.notify("Generating detailed story...", 50);
        let markdown = self.call(prompts::story_detail_prompt(story), token).await?;
        progress.notify("Story details ready.", 100);
        Ok(markdown.trim().to_string())
    }
}
