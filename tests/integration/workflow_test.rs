//! Session Workflow Integration Tests
//!
//! Drives the workflow through whole sessions:
//! - Examples-present skip and the confirmation path
//! - Batches with unreadable screenshots
//! - Follow-up history
//! - Debug pipeline
//! - Cancellation and preemption of in-flight chains

use std::sync::Arc;

use interview_assist_desktop::services::{ProcessOutcome, SessionEvent, SessionPhase};
use interview_assist_desktop::{AppConfig, AppError, SolutionRecord};

use crate::common::*;

// ============================================================================
// Extraction and understanding
// ============================================================================

#[tokio::test]
async fn test_examples_present_skips_confirmation() {
    let (_dir, paths) = screenshots(1);
    let client = MockClient::new(vec![
        text(TWO_SUM_EXTRACTION),
        text(EXAMPLES_PRESENT),
        text(NARRATIVE),
    ]);
    let mut h = Harness::new(client.clone(), paths);

    let outcome = h.workflow.process_queue().await.unwrap();
    assert!(matches!(outcome, ProcessOutcome::Solved(SolutionRecord::Narrative(_))));
    assert_eq!(client.calls(), 3);

    let events = h.drain();
    assert!(!events
        .iter()
        .any(|e| matches!(e, SessionEvent::UnderstandingReady { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::Progress { progress: 45, .. })));
    assert!(matches!(events.last(), Some(SessionEvent::SolutionReady { .. })));

    // The extracted fields stand in for the understanding
    let snapshot = h.workflow.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::SolutionReady);
    let confirmed = snapshot.confirmed.unwrap();
    assert_eq!(confirmed.understanding, "Two Sum");
    assert_eq!(confirmed.examples[0].input, "[2,7,11,15], 9");
    assert_eq!(confirmed.examples[0].output, "[0,1]");
}

#[tokio::test]
async fn test_confirmation_path() {
    let (_dir, paths) = screenshots(2);
    let client = MockClient::new(vec![
        text(TWO_SUM_EXTRACTION),
        text(UNDERSTANDING),
        text(NARRATIVE),
    ]);
    let mut h = Harness::new(client.clone(), paths);

    let outcome = h.workflow.process_queue().await.unwrap();
    let understanding = match outcome {
        ProcessOutcome::AwaitingConfirmation(understanding) => understanding,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(understanding.clarifying_questions.len(), 1);
    assert_eq!(h.workflow.phase().await, SessionPhase::AwaitingConfirmation);

    let record = h.workflow.confirm_understanding().await.unwrap();
    assert_eq!(record.kind(), "narrative");

    // The solve prompt carries the generated, not the extracted, example
    let requests = client.requests();
    assert_eq!(requests[0].images.len(), 2);
    assert_eq!(requests[0].images[0].media_type, "image/png");
    assert!(requests[2].prompt.contains("[3,3], 6"));

    let events = h.drain();
    let progress: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Progress { progress, .. } => Some(*progress),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![20, 40, 50, 60, 90, 100]);
}

#[tokio::test]
async fn test_jpeg_screenshots_are_sent_as_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let shot = dir.path().join("shot.jpg");
    std::fs::write(&shot, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
    let client = MockClient::new(vec![text(TWO_SUM_EXTRACTION), text(UNDERSTANDING)]);
    let h = Harness::new(client.clone(), vec![shot]);

    h.workflow.process_queue().await.unwrap();

    let image = &client.requests()[0].images[0];
    assert_eq!(image.media_type, "image/jpeg");
    assert_eq!(image.data, "/9j/4A==");
}

#[tokio::test]
async fn test_malformed_extraction_stops_before_understanding() {
    let (_dir, paths) = screenshots(1);
    let client = MockClient::new(vec![text("not json at all"), text(UNDERSTANDING)]);
    let mut h = Harness::new(client.clone(), paths);

    let err = h.workflow.process_queue().await.unwrap_err();
    assert!(matches!(err, AppError::Response(_)));
    assert!(err.to_string().contains("Failed to parse JSON for ProblemInfo"));
    assert_eq!(client.calls(), 1);
    assert_eq!(h.workflow.phase().await, SessionPhase::Error);
    assert!(h
        .drain()
        .iter()
        .any(|e| matches!(e, SessionEvent::Error { .. })));
}

#[tokio::test]
async fn test_one_missing_screenshot_does_not_abort_batch() {
    let (dir, mut paths) = screenshots(2);
    paths.insert(1, dir.path().join("deleted.png"));
    let client = MockClient::new(vec![text(TWO_SUM_EXTRACTION), text(UNDERSTANDING)]);
    let h = Harness::new(client.clone(), paths);

    let outcome = h.workflow.process_queue().await.unwrap();
    assert!(matches!(outcome, ProcessOutcome::AwaitingConfirmation(_)));
    assert_eq!(client.requests()[0].images.len(), 2);
}

#[tokio::test]
async fn test_no_readable_screenshots_is_a_specific_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockClient::new(vec![]);
    let h = Harness::new(client.clone(), vec![dir.path().join("gone.png")]);

    let err = h.workflow.process_queue().await.unwrap_err();
    assert!(matches!(err, AppError::NoValidScreenshots(_)));
    assert_eq!(client.calls(), 0);
    assert_eq!(h.workflow.phase().await, SessionPhase::Idle);
}

#[tokio::test]
async fn test_failed_clarification_keeps_previous_understanding() {
    let (_dir, paths) = screenshots(1);
    let client = MockClient::new(vec![
        text(TWO_SUM_EXTRACTION),
        text(UNDERSTANDING),
        text(r#"{"understandingStatement": "missing the rest"}"#),
    ]);
    let h = Harness::new(client.clone(), paths);
    h.workflow.process_queue().await.unwrap();

    let err = h
        .workflow
        .submit_clarification("Each element is used once")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("ProblemUnderstandingData"));

    let snapshot = h.workflow.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::AwaitingConfirmation);
    assert!(snapshot
        .understanding
        .unwrap()
        .understanding_statement
        .starts_with("Return the indices"));
}

// ============================================================================
// Solution, follow-ups and debug
// ============================================================================

async fn solved(client: Arc<MockClient>) -> (Harness, tempfile::TempDir) {
    let (dir, paths) = screenshots(1);
    let h = Harness::new(client, paths);
    h.workflow.process_queue().await.unwrap();
    (h, dir)
}

#[tokio::test]
async fn test_follow_ups_append_to_history() {
    let client = MockClient::new(vec![
        text(TWO_SUM_EXTRACTION),
        text(EXAMPLES_PRESENT),
        text(NARRATIVE),
        text(&follow_up("first revision")),
        text(&follow_up("second revision")),
    ]);
    let (mut h, _dir) = solved(client.clone()).await;
    let original = h.workflow.snapshot().await.history[0].clone();

    h.workflow.submit_follow_up("Can you use less memory?").await.unwrap();
    let second = h.workflow.submit_follow_up("Now sort first").await.unwrap();
    assert_eq!(second.code, "second revision");

    let snapshot = h.workflow.snapshot().await;
    assert_eq!(snapshot.history.len(), 3);
    assert_eq!(snapshot.history[0], original);
    assert_eq!(snapshot.history[1].code, "first revision");
    assert_eq!(snapshot.phase, SessionPhase::SolutionReady);

    // The second follow-up revises the first, not the original
    assert!(client.requests()[4].prompt.contains("first revision"));

    let indices: Vec<usize> = h
        .drain()
        .iter()
        .filter_map(|e| match e {
            SessionEvent::FollowUpReady { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(indices, vec![1, 2]);
}

#[tokio::test]
async fn test_failed_follow_up_leaves_history_untouched() {
    let client = MockClient::new(vec![
        text(TWO_SUM_EXTRACTION),
        text(EXAMPLES_PRESENT),
        text(NARRATIVE),
        text("I would rather explain in prose"),
    ]);
    let (h, _dir) = solved(client).await;

    assert!(h.workflow.submit_follow_up("Why?").await.is_err());
    let snapshot = h.workflow.snapshot().await;
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.phase, SessionPhase::SolutionReady);
}

#[tokio::test]
async fn test_debug_pipeline_after_solution() {
    let client = MockClient::new(vec![
        text(TWO_SUM_EXTRACTION),
        text(EXAMPLES_PRESENT),
        text(NARRATIVE),
        text("### Issues Identified\n- Off-by-one in the loop\n\n```python\nfor i in range(len(nums)):\n    pass\n```"),
    ]);
    let (mut h, dir) = solved(client.clone()).await;
    let extra = dir.path().join("attempt.png");
    std::fs::write(&extra, b"attempt").unwrap();
    h.store.enqueue_extra(extra);

    let outcome = h.workflow.process_screenshots().await.unwrap();
    let debug = match outcome {
        ProcessOutcome::Debugged(debug) => debug,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(debug.time_complexity, "N/A - Debug mode");
    assert!(debug.code.contains("for i in range"));

    // Main and extra screenshots, plus the current code in the prompt
    let request = &client.requests()[3];
    assert_eq!(request.images.len(), 2);
    assert!(request.prompt.contains("seen = {}"));

    assert_eq!(h.workflow.phase().await, SessionPhase::SolutionReady);
    let events = h.drain();
    assert!(events.iter().any(|e| matches!(e, SessionEvent::DebugStarted)));
    assert!(matches!(events.last(), Some(SessionEvent::DebugReady { .. })));
}

#[tokio::test]
async fn test_fallback_solution_is_stored() {
    let (_dir, paths) = screenshots(1);
    let client = MockClient::new(vec![
        text(TWO_SUM_EXTRACTION),
        text(EXAMPLES_PRESENT),
        text(r#"{"problemAnalysis": "incomplete"}"#),
        text(STANDARD),
    ]);
    let config = AppConfig {
        language: "python".to_string(),
        ..Default::default()
    };
    let h = Harness::with_config(client.clone(), paths, config);

    let outcome = h.workflow.process_queue().await.unwrap();
    assert!(matches!(outcome, ProcessOutcome::Solved(SolutionRecord::Basic(_))));
    assert_eq!(client.calls(), 4);
    assert!(client.requests()[3]
        .system_prompt
        .contains("providing direct solutions"));
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_discards_in_flight_extraction() {
    let (_dir, paths) = screenshots(1);
    let client = MockClient::new(vec![Reply::Block]);
    let mut h = Harness::new(client.clone(), paths);

    let workflow = h.workflow.clone();
    let running = tokio::spawn(async move { workflow.process_queue().await });
    client.wait_for_calls(1).await;
    assert_eq!(h.workflow.phase().await, SessionPhase::Extracting);

    h.workflow.cancel().await;
    let result = running.await.unwrap();
    assert!(result.unwrap_err().is_cancelled());

    let snapshot = h.workflow.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Cancelled);
    assert!(snapshot.problem_info.is_none());
    assert_eq!(client.calls(), 1);
    assert!(!h
        .drain()
        .iter()
        .any(|e| matches!(e, SessionEvent::Error { .. })));
}

#[tokio::test]
async fn test_cancelled_solve_never_falls_back() {
    let (_dir, paths) = screenshots(1);
    let client = MockClient::new(vec![
        text(TWO_SUM_EXTRACTION),
        text(UNDERSTANDING),
        Reply::Block,
        text(STANDARD),
    ]);
    let h = Harness::new(client.clone(), paths);
    h.workflow.process_queue().await.unwrap();

    let workflow = h.workflow.clone();
    let running = tokio::spawn(async move { workflow.confirm_understanding().await });
    client.wait_for_calls(3).await;
    h.workflow.cancel().await;

    assert!(running.await.unwrap().unwrap_err().is_cancelled());
    assert_eq!(client.calls(), 3);
    assert!(h.workflow.snapshot().await.solution.is_none());
}

#[tokio::test]
async fn test_new_batch_preempts_running_one() {
    let (_dir, paths) = screenshots(1);
    let client = MockClient::new(vec![
        Reply::Block,
        text(TWO_SUM_EXTRACTION),
        text(UNDERSTANDING),
    ]);
    let h = Harness::new(client.clone(), paths);

    let workflow = h.workflow.clone();
    let first = tokio::spawn(async move { workflow.process_queue().await });
    client.wait_for_calls(1).await;

    let second = h.workflow.process_queue().await.unwrap();
    assert!(matches!(second, ProcessOutcome::AwaitingConfirmation(_)));
    assert!(first.await.unwrap().unwrap_err().is_cancelled());

    // The preempted chain wrote nothing
    let snapshot = h.workflow.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::AwaitingConfirmation);
    assert_eq!(snapshot.problem_info.unwrap().statement_or(""), "Two Sum");
}

#[tokio::test]
async fn test_new_batch_preempts_running_solve() {
    let (_dir, paths) = screenshots(1);
    let client = MockClient::new(vec![
        text(TWO_SUM_EXTRACTION),
        text(UNDERSTANDING),
        Reply::Block,
        text(TWO_SUM_EXTRACTION),
        text(UNDERSTANDING),
    ]);
    let mut h = Harness::new(client.clone(), paths);
    h.workflow.process_queue().await.unwrap();

    let workflow = h.workflow.clone();
    let solving = tokio::spawn(async move { workflow.confirm_understanding().await });
    client.wait_for_calls(3).await;
    assert_eq!(h.workflow.phase().await, SessionPhase::Solving);
    h.drain();

    let second = h.workflow.process_queue().await.unwrap();
    assert!(matches!(second, ProcessOutcome::AwaitingConfirmation(_)));
    assert!(solving.await.unwrap().unwrap_err().is_cancelled());

    // No fallback for the preempted solve and no error reported for it
    assert_eq!(client.calls(), 5);
    let snapshot = h.workflow.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::AwaitingConfirmation);
    assert!(snapshot.solution.is_none());
    assert!(!h
        .drain()
        .iter()
        .any(|e| matches!(e, SessionEvent::Error { .. })));
}

#[tokio::test]
async fn test_reset_returns_to_idle() {
    let client = MockClient::new(vec![
        text(TWO_SUM_EXTRACTION),
        text(EXAMPLES_PRESENT),
        text(NARRATIVE),
    ]);
    let (mut h, _dir) = solved(client).await;
    let before = h.workflow.snapshot().await.session_id;

    h.workflow.reset().await;
    let snapshot = h.workflow.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Idle);
    assert!(snapshot.solution.is_none());
    assert!(snapshot.history.is_empty());
    assert_ne!(snapshot.session_id, before);
    assert_eq!(h.drain().last(), Some(&SessionEvent::Reset));
}
