//! Shared fixtures: a scripted completion client and screenshot helpers

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;

use interview_assist_desktop::services::{
    ChannelEventSink, FileScreenshotStore, SessionEvent, SessionWorkflow,
};
use interview_assist_desktop::AppConfig;
use interview_assist_llm::{CompletionClient, CompletionRequest, LlmError, LlmResult};

pub const TWO_SUM_EXTRACTION: &str = r#"{
  "problem_statement": "Two Sum",
  "constraints": "2 <= nums.length <= 10^4",
  "example_input": "[2,7,11,15], 9",
  "example_output": "[0,1]"
}"#;

pub const EXAMPLES_PRESENT: &str = r#"```json
{"examplesPresent": true}
```"#;

pub const UNDERSTANDING: &str = r#"{
  "understandingStatement": "Return the indices of the two numbers that add up to target.",
  "generatedExamples": [{"input": "[3,3], 6", "output": "[0,1]", "explanation": "3 + 3 = 6"}],
  "clarifyingQuestions": ["Can the same element be used twice?"]
}"#;

pub const NARRATIVE: &str = r#"{
  "problemAnalysis": "Find two indices whose values sum to target.",
  "bruteForce": {"explanation": "Check every pair", "codeOrPseudocode": "for i, for j", "timeComplexity": "O(n^2)", "spaceComplexity": "O(1)", "inefficiencyReason": "Quadratic"},
  "optimizationStrategy": {"explanation": "Remember complements", "pseudocode": "map[target - x]", "timeComplexity": "O(n)", "spaceComplexity": "O(n)"},
  "optimalImplementation": {"code": "def two_sum(nums, target):\n    seen = {}", "dryRun": "i=0: seen={2: 0}"}
}"#;

pub const STANDARD: &str = "### Thoughts\n- Use a hash map of complements\n\n### Code\n```python\ndef two_sum(nums, target):\n    return []\n```\n\n### Time Complexity\nO(n) - single pass\n\n### Space Complexity\nO(n) - the map";

pub fn follow_up(code: &str) -> String {
    format!(
        r#"{{"optimalImplementation": {{"code": "{}", "dryRun": "trace"}}}}"#,
        code
    )
}

/// What the client does for one call
pub enum Reply {
    Text(String),
    Fail(LlmError),
    /// Wait until the call's token is cancelled, then fail with `Cancelled`
    Block,
}

pub fn text(raw: &str) -> Reply {
    Reply::Text(raw.to_string())
}

pub fn network_error() -> Reply {
    Reply::Fail(LlmError::NetworkError {
        message: "connection reset by peer".to_string(),
    })
}

/// Plays scripted replies in order; an exhausted script fails every call
pub struct MockClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
    called: Notify,
}

impl MockClient {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            called: Notify::new(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Resolves once `n` calls have started
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            self.called.notified().await;
        }
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    async fn complete(
        &self,
        request: CompletionRequest,
        token: &CancellationToken,
    ) -> LlmResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        self.called.notify_one();

        match reply {
            Some(Reply::Text(raw)) => Ok(raw),
            Some(Reply::Fail(err)) => Err(err),
            Some(Reply::Block) => {
                token.cancelled().await;
                Err(LlmError::Cancelled)
            }
            None => Err(LlmError::ServerError {
                message: "script exhausted".to_string(),
                status: Some(500),
            }),
        }
    }
}

/// PNG-named files with distinct contents in a temp dir
pub fn screenshots(count: usize) -> (tempfile::TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let paths = (0..count)
        .map(|i| {
            let path = dir.path().join(format!("shot_{}.png", i));
            std::fs::write(&path, format!("image-{}", i)).unwrap();
            path
        })
        .collect();
    (dir, paths)
}

pub struct Harness {
    pub workflow: Arc<SessionWorkflow>,
    pub store: Arc<FileScreenshotStore>,
    pub client: Arc<MockClient>,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl Harness {
    pub fn new(client: Arc<MockClient>, queue: Vec<PathBuf>) -> Self {
        Self::with_config(client, queue, AppConfig::default())
    }

    pub fn with_config(client: Arc<MockClient>, queue: Vec<PathBuf>, config: AppConfig) -> Self {
        let store = Arc::new(FileScreenshotStore::with_queue(queue));
        let (sink, events) = ChannelEventSink::channel();
        let workflow = Arc::new(SessionWorkflow::new(
            client.clone(),
            store.clone(),
            Arc::new(config),
            Arc::new(sink),
        ));
        Self {
            workflow,
            store,
            client,
            events,
        }
    }

    /// Every event emitted so far
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
