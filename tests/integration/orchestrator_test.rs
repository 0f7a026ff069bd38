//! Solution Orchestrator Integration Tests
//!
//! Exercises the primary paths and the single standard fallback through the
//! public orchestrator API with a scripted client.

use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use interview_assist_core::NoopProgress;
use interview_assist_desktop::services::orchestrator::STANDARD_STAGE;
use interview_assist_desktop::services::validator::parse_problem_info;
use interview_assist_desktop::services::{
    OrchestrationError, SolutionOrchestrator, SolutionRequest,
};
use interview_assist_desktop::{
    AppError, ConfirmedUnderstanding, ProblemInfo, SolutionMode, SolutionRecord,
};

use crate::common::*;

const BRUTE: &str = "### Code\n```python\nfor i in range(n):\n    for j in range(n):\n        pass\n```\n\n### Time Complexity\nO(n^2) - every pair is checked\n\n### Space Complexity\nO(1) - no extra storage";

const OPTIMIZED: &str = "### Optimization Analysis\n- Trade memory for time\n- Look up complements\n\n### Optimized Code\n```python\nseen = {}\n```\n\n### Time Complexity\nO(n) - one pass\n\n### Space Complexity\nO(n) - the map";

fn two_sum() -> (ProblemInfo, ConfirmedUnderstanding) {
    let info = parse_problem_info(TWO_SUM_EXTRACTION).unwrap();
    let confirmed = ConfirmedUnderstanding::from_extraction(&info);
    (info, confirmed)
}

fn request<'a>(
    info: &'a ProblemInfo,
    confirmed: Option<&'a ConfirmedUnderstanding>,
    mode: SolutionMode,
) -> SolutionRequest<'a> {
    SolutionRequest {
        problem_info: Some(info),
        confirmed,
        language: "python",
        mode,
    }
}

#[tokio::test]
async fn test_failing_primary_makes_exactly_one_fallback_call() {
    let (info, confirmed) = two_sum();
    let client = MockClient::new(vec![network_error(), network_error(), text(STANDARD)]);
    let orchestrator = SolutionOrchestrator::new(client.clone());

    let err = orchestrator
        .generate(
            request(&info, Some(&confirmed), SolutionMode::Narrative),
            &NoopProgress,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(client.calls(), 2);
    match err {
        OrchestrationError::Failed { log, .. } => {
            assert_eq!(log.attempts.len(), 2);
            assert!(!log.overall_success);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_failure_surfaces_the_primary_error() {
    let (info, confirmed) = two_sum();
    let client = MockClient::new(vec![text("{\"problemAnalysis\": 42"), network_error()]);
    let orchestrator = SolutionOrchestrator::new(client);

    let err = orchestrator
        .generate(
            request(&info, Some(&confirmed), SolutionMode::Narrative),
            &NoopProgress,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    let err = AppError::from(err);
    assert!(matches!(err, AppError::Response(_)));
    assert!(err.to_string().contains("NarrativeSolutionData"));
}

#[tokio::test]
async fn test_invalid_narrative_falls_back_to_standard() {
    let (info, confirmed) = two_sum();
    let client = MockClient::new(vec![text("Sorry, here is prose instead."), text(STANDARD)]);
    let orchestrator = SolutionOrchestrator::new(client.clone());

    let solution = orchestrator
        .generate(
            request(&info, Some(&confirmed), SolutionMode::Narrative),
            &NoopProgress,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(solution.log.used_fallback());
    assert_eq!(solution.log.successful_stage.as_deref(), Some(STANDARD_STAGE));
    match solution.record {
        SolutionRecord::Basic(basic) => {
            assert!(basic.code.starts_with("def two_sum"));
            assert!(basic.time_complexity.starts_with("O(n)"));
        }
        other => panic!("unexpected record: {:?}", other.kind()),
    }
    assert!(client.requests()[1]
        .system_prompt
        .contains("providing direct solutions"));
}

#[tokio::test]
async fn test_cancelled_primary_never_falls_back() {
    let (info, confirmed) = two_sum();
    let client = MockClient::new(vec![Reply::Block, text(STANDARD)]);
    let orchestrator = SolutionOrchestrator::new(client.clone());
    let token = CancellationToken::new();

    let cancel = async {
        client.wait_for_calls(1).await;
        token.cancel();
    };
    let (result, _) = tokio::join!(
        orchestrator.generate(
            request(&info, Some(&confirmed), SolutionMode::Narrative),
            &NoopProgress,
            &token,
        ),
        cancel
    );

    assert!(matches!(result, Err(OrchestrationError::Cancelled)));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_detailed_path_feeds_brute_force_into_optimize() {
    let (info, _) = two_sum();
    let client = MockClient::new(vec![text(BRUTE), text(OPTIMIZED)]);
    let orchestrator = SolutionOrchestrator::new(client.clone());
    let seen = Mutex::new(Vec::new());
    let progress = |_: &str, pct: u8| seen.lock().unwrap().push(pct);

    // Detailed mode needs no confirmed understanding
    let solution = orchestrator
        .generate(
            request(&info, None, SolutionMode::Detailed),
            &progress,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!solution.log.used_fallback());
    match solution.record {
        SolutionRecord::Detailed(detailed) => {
            assert!(detailed.brute_force_code.starts_with("for i in range(n)"));
            assert_eq!(detailed.optimized_code, "seen = {}");
            assert_eq!(detailed.optimization_analysis.len(), 2);
            assert!(!detailed.optimized_complexity_rationale.is_empty());
        }
        other => panic!("unexpected record: {:?}", other.kind()),
    }

    assert!(client.requests()[1].prompt.contains("for j in range(n)"));
    assert_eq!(*seen.lock().unwrap(), vec![40, 60, 80, 100]);
}

#[tokio::test]
async fn test_narrative_mode_requires_confirmation() {
    let (info, _) = two_sum();
    let client = MockClient::new(vec![text(NARRATIVE)]);
    let orchestrator = SolutionOrchestrator::new(client.clone());

    let err = orchestrator
        .generate(
            request(&info, None, SolutionMode::Narrative),
            &NoopProgress,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestrationError::Precondition(_)));
    assert_eq!(client.calls(), 0);
}
