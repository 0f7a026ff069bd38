//! Behavioral Assistant Integration Tests
//!
//! Loads a story library from disk and runs whole question flows.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio_util::sync::CancellationToken;

use interview_assist_core::NoopProgress;
use interview_assist_desktop::storage::stories::{PRINCIPLES_FILE, STORIES_FILE};
use interview_assist_desktop::{AppConfig, AppError, BehavioralAssistant, StoryLibrary};

use crate::common::*;

fn write_library(dir: &Path) {
    let principles = json!([
        {"name": "Ownership", "description": "Leaders act on behalf of the entire company."},
        {"name": "Dive Deep", "description": "Leaders operate at all levels."}
    ]);
    let stories = json!([
        {
            "id": "story_001",
            "title": "Payment outage",
            "principles": ["Ownership", "Dive Deep"],
            "situation": "Checkout failed for 5% of users",
            "task": "Find the root cause",
            "action": "Traced retries across three services",
            "result": "Fixed in two hours"
        },
        {
            "id": "story_002",
            "title": "Onboarding docs",
            "situation": "New hires took weeks to ship",
            "task": "Shorten ramp-up",
            "action": "Wrote a guided first task",
            "result": "First PR in three days"
        }
    ]);
    std::fs::write(dir.join(PRINCIPLES_FILE), principles.to_string()).unwrap();
    std::fs::write(dir.join(STORIES_FILE), stories.to_string()).unwrap();
}

fn library(dir: &Path) -> Arc<StoryLibrary> {
    let config = AppConfig {
        data_dir: Some(dir.to_path_buf()),
        ..AppConfig::default()
    };
    Arc::new(StoryLibrary::for_config(&config).unwrap())
}

#[tokio::test]
async fn test_answer_selects_story_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_library(dir.path());
    let client = MockClient::new(vec![
        text(r#"["Ownership", "Dive Deep"]"#),
        text(r#"{"selectedStoryId": "story_001", "reasoning": "Shows a deep investigation."}"#),
    ]);
    let assistant = BehavioralAssistant::new(client.clone(), library(dir.path()));
    let seen = Mutex::new(Vec::new());
    let progress = |message: &str, pct: u8| seen.lock().unwrap().push((pct, message.to_string()));

    let answer = assistant
        .answer_question(
            "Tell me about a time you owned a production issue.",
            &progress,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(answer.principles, vec!["Ownership", "Dive Deep"]);
    assert_eq!(answer.selected_story.unwrap().title, "Payment outage");
    assert_eq!(answer.reasoning, "Shows a deep investigation.");

    // Every stored story is offered for selection
    let selection_prompt = &client.requests()[1].prompt;
    assert!(selection_prompt.contains("Story ID: story_001"));
    assert!(selection_prompt.contains("Story ID: story_002"));

    let seen = seen.lock().unwrap();
    let percents: Vec<u8> = seen.iter().map(|(pct, _)| *pct).collect();
    assert_eq!(percents, vec![10, 30, 60, 100]);
    assert_eq!(seen[3].1, "Story selection complete.");
}

#[tokio::test]
async fn test_unknown_story_id_is_reported_in_reasoning() {
    let dir = tempfile::tempdir().unwrap();
    write_library(dir.path());
    let client = MockClient::new(vec![
        text(r#"["Ownership"]"#),
        text(r#"{"selectedStoryId": "story_999", "reasoning": "Best fit."}"#),
    ]);
    let assistant = BehavioralAssistant::new(client, library(dir.path()));

    let answer = assistant
        .answer_question("Describe a hard call.", &NoopProgress, &CancellationToken::new())
        .await
        .unwrap();

    assert!(answer.selected_story.is_none());
    assert_eq!(
        answer.reasoning,
        "Best fit. (Error: Selected story ID not found internally)"
    );
}

#[tokio::test]
async fn test_broken_selection_degrades_to_no_story() {
    let dir = tempfile::tempdir().unwrap();
    write_library(dir.path());
    let client = MockClient::new(vec![text(r#"["Dive Deep"]"#), network_error()]);
    let assistant = BehavioralAssistant::new(client, library(dir.path()));

    let answer = assistant
        .answer_question("Describe a hard bug.", &NoopProgress, &CancellationToken::new())
        .await
        .unwrap();

    assert!(answer.selected_story.is_none());
    assert!(answer.reasoning.starts_with("Error during selection:"));
    assert_eq!(answer.principles, vec!["Dive Deep"]);
}

#[tokio::test]
async fn test_detail_and_follow_ups_for_selected_story() {
    let dir = tempfile::tempdir().unwrap();
    write_library(dir.path());
    let client = MockClient::new(vec![
        text("\n## The payment outage\nI was on call when...\n\n"),
        text(r#"[{"question": "What would you do differently?", "answer": "Add alerting earlier."}]"#),
        text(r#"{"explanation": "I paged the owning team first."}"#),
    ]);
    let library = library(dir.path());
    let story = library.find_story("story_001").unwrap().clone();
    let assistant = BehavioralAssistant::new(client.clone(), library);
    let token = CancellationToken::new();

    let detail = assistant
        .story_detail("story_001", &NoopProgress, &token)
        .await
        .unwrap();
    assert!(detail.starts_with("## The payment outage"));

    let anticipated = assistant
        .anticipate_follow_ups("Tell me about an outage.", &story, &token)
        .await
        .unwrap();
    assert_eq!(anticipated.len(), 1);
    assert_eq!(anticipated[0].answer, "Add alerting earlier.");

    let explanation = assistant
        .follow_up("Tell me about an outage.", &story, "Who did you escalate to?", &token)
        .await
        .unwrap();
    assert_eq!(explanation, "I paged the owning team first.");
    assert!(client.requests()[2].prompt.contains("Who did you escalate to?"));
}

#[tokio::test]
async fn test_missing_library_files_are_config_errors() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        data_dir: Some(dir.path().to_path_buf()),
        ..AppConfig::default()
    };

    let err = StoryLibrary::for_config(&config).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
    assert!(err.to_string().contains("Leadership Principles"));
}
