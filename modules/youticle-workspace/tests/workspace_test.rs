//! Workspace state machine tests: hand-craft backend responses, drive the
//! submit/select/generate transitions, assert the resulting state.
//! No network, no backend process.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use strategy_client::{
    CommentCollectionRequest, CommentCollectionResult, Result as ClientResult, ScriptOutput,
    ScriptRequest, SignalOutput, SignalRequest, StrategyError,
};
use youticle_workspace::{ChannelQuery, StrategyBackend, Workspace};

#[derive(Default)]
struct MockBackend {
    collect_queue: Mutex<VecDeque<ClientResult<CommentCollectionResult>>>,
    signal_queue: Mutex<VecDeque<ClientResult<SignalOutput>>>,
    script_queue: Mutex<VecDeque<ClientResult<ScriptOutput>>>,
    collect_calls: AtomicUsize,
    signal_calls: AtomicUsize,
    script_calls: AtomicUsize,
    signal_requests: Mutex<Vec<SignalRequest>>,
    script_requests: Mutex<Vec<ScriptRequest>>,
}

impl MockBackend {
    fn queue_collect(&self, response: ClientResult<CommentCollectionResult>) {
        self.collect_queue.lock().unwrap().push_back(response);
    }

    fn queue_signals(&self, response: ClientResult<SignalOutput>) {
        self.signal_queue.lock().unwrap().push_back(response);
    }

    fn queue_script(&self, response: ClientResult<ScriptOutput>) {
        self.script_queue.lock().unwrap().push_back(response);
    }
}

fn unexpected_call(stage: &str) -> StrategyError {
    StrategyError::Api {
        status: 500,
        message: format!("unexpected {stage} call"),
    }
}

#[async_trait]
impl StrategyBackend for MockBackend {
    async fn collect_comments(
        &self,
        _request: &CommentCollectionRequest,
    ) -> ClientResult<CommentCollectionResult> {
        self.collect_calls.fetch_add(1, Ordering::SeqCst);
        self.collect_queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unexpected_call("collect")))
    }

    async fn signals_from_comments(&self, request: &SignalRequest) -> ClientResult<SignalOutput> {
        self.signal_calls.fetch_add(1, Ordering::SeqCst);
        self.signal_requests.lock().unwrap().push(request.clone());
        self.signal_queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unexpected_call("signal")))
    }

    async fn script_from_signal(&self, request: &ScriptRequest) -> ClientResult<ScriptOutput> {
        self.script_calls.fetch_add(1, Ordering::SeqCst);
        self.script_requests.lock().unwrap().push(request.clone());
        self.script_queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unexpected_call("script")))
    }
}

fn backend_error(detail: &str) -> StrategyError {
    StrategyError::Api {
        status: 500,
        message: detail.to_string(),
    }
}

fn collection_fixture() -> CommentCollectionResult {
    serde_json::from_value(json!({
        "channel_handle": "@creators",
        "channel_id": "UC123",
        "channel_name": "Creators",
        "subscriber_count": 1200,
        "video_count": 1,
        "videos": [{
            "video_id": "v1",
            "video_title": "Latest upload",
            "comment_count": 2,
            "comments": [
                {"comment_id": "c1", "author": "a", "text": "first comment", "like_count": 5},
                {"comment_id": "c2", "text": "second comment", "like_count": 0}
            ]
        }]
    }))
    .expect("invalid collection fixture")
}

fn two_signals_fixture() -> SignalOutput {
    serde_json::from_value(json!({
        "signals": [
            {"signal_id": "sig-1", "title": "First demand", "demand_statement": "go deeper"},
            {"signal_id": "sig-2", "title": "Second demand"}
        ],
        "model": "test-model"
    }))
    .expect("invalid signal fixture")
}

fn script_fixture() -> ScriptOutput {
    serde_json::from_value(json!({
        "script": {
            "title": "Generated title",
            "hook_0_15s": "hook line",
            "body_15_150s": [{"dialogue": "body", "start_time_seconds": 15, "end_time_seconds": 150}],
            "closing_150_180s": "closing line"
        }
    }))
    .expect("invalid script fixture")
}

fn workspace() -> (Arc<MockBackend>, Workspace<Arc<MockBackend>>) {
    let backend = Arc::new(MockBackend::default());
    let workspace = Workspace::new(backend.clone());
    (backend, workspace)
}

async fn submitted_workspace() -> (Arc<MockBackend>, Workspace<Arc<MockBackend>>) {
    let (backend, mut workspace) = workspace();
    backend.queue_collect(Ok(collection_fixture()));
    backend.queue_signals(Ok(two_signals_fixture()));
    workspace.submit(ChannelQuery::new("@creators", 2)).await;
    assert!(workspace.error_message().is_none(), "submission should succeed");
    (backend, workspace)
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_selects_first_signal_and_maps_stage_two_request() {
    let (backend, workspace) = submitted_workspace().await;

    let result = workspace.result().expect("result after submission");
    assert_eq!(result.channel_id, "UC123");
    assert_eq!(result.signal_output.signals.len(), 2);
    assert_eq!(
        result.selected_signal.as_ref().map(|s| s.signal_id.as_str()),
        Some("sig-1")
    );
    assert!(result.script_output.is_none());

    assert_eq!(backend.collect_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.signal_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.script_calls.load(Ordering::SeqCst), 0);

    // stage-2 request shape: renamed title, stripped comments, default filters
    let requests = backend.signal_requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.language, "ko");
    assert_eq!(request.videos.len(), 1);
    assert_eq!(request.videos[0].title.as_deref(), Some("Latest upload"));
    assert_eq!(request.videos[0].comments.len(), 2);
    assert!(request.videos[0].comment_error.is_none());
    assert_eq!(request.filters.topk_per_video, 50);
    assert_eq!(request.filters.dedupe, "semantic");
}

#[tokio::test]
async fn invalid_handle_blocks_submission_without_network() {
    let (backend, mut workspace) = workspace();

    workspace.submit(ChannelQuery::new("@ab", 2)).await;

    let message = workspace.error_message().expect("validation message");
    assert!(message.starts_with("Validation error"), "got: {message}");
    assert!(workspace.result().is_none());
    assert_eq!(backend.collect_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_handle_keeps_prior_result() {
    let (_backend, mut workspace) = submitted_workspace().await;

    workspace.submit(ChannelQuery::new("@ab", 2)).await;

    assert!(workspace.error_message().is_some());
    assert!(workspace.result().is_some(), "blocked submission must not clear state");
}

#[tokio::test]
async fn stage_one_failure_reports_detail_and_skips_stage_two() {
    let (backend, mut workspace) = workspace();
    backend.queue_collect(Err(backend_error("channel not found")));

    workspace.submit(ChannelQuery::new("@creators", 2)).await;

    assert_eq!(workspace.error_message(), Some("channel not found"));
    assert!(workspace.result().is_none());
    assert_eq!(backend.signal_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stage_two_failure_discards_partial_result() {
    let (backend, mut workspace) = workspace();
    backend.queue_collect(Ok(collection_fixture()));
    backend.queue_signals(Err(backend_error("signal model unavailable")));

    workspace.submit(ChannelQuery::new("@creators", 2)).await;

    assert_eq!(workspace.error_message(), Some("signal model unavailable"));
    assert!(workspace.result().is_none(), "stage-1 data must not survive alone");
}

#[tokio::test]
async fn resubmission_replaces_result_and_drops_script() {
    let (backend, mut workspace) = submitted_workspace().await;
    backend.queue_script(Ok(script_fixture()));
    workspace.generate_script().await;
    assert!(workspace.result().unwrap().script_output.is_some());

    backend.queue_collect(Ok(collection_fixture()));
    backend.queue_signals(Ok(two_signals_fixture()));
    workspace.submit(ChannelQuery::new("@creators", 2)).await;

    let result = workspace.result().unwrap();
    assert!(result.script_output.is_none());
    assert_eq!(
        result.selected_signal.as_ref().map(|s| s.signal_id.as_str()),
        Some("sig-1")
    );
}

#[tokio::test]
async fn empty_signal_list_is_a_valid_ready_state() {
    let (backend, mut workspace) = workspace();
    backend.queue_collect(Ok(collection_fixture()));
    backend.queue_signals(Ok(SignalOutput::default()));

    workspace.submit(ChannelQuery::new("@creators", 2)).await;

    assert!(workspace.error_message().is_none());
    let result = workspace.result().expect("ready with nothing to select");
    assert!(result.selected_signal.is_none());

    // selection is a no-op on an empty list
    workspace.select_signal("sig-1");
    assert!(workspace.selected_signal().is_none());

    // and script generation is refused without a request
    workspace.generate_script().await;
    assert!(workspace.error_message().unwrap().starts_with("State error"));
    assert_eq!(backend.script_calls.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn select_signal_switches_selection_and_clears_script() {
    let (backend, mut workspace) = submitted_workspace().await;
    backend.queue_script(Ok(script_fixture()));
    workspace.generate_script().await;
    assert!(workspace.result().unwrap().script_output.is_some());

    workspace.select_signal("sig-2");

    let result = workspace.result().unwrap();
    assert_eq!(
        result.selected_signal.as_ref().map(|s| s.signal_id.as_str()),
        Some("sig-2")
    );
    assert!(result.script_output.is_none(), "script is bound to one signal");
}

#[tokio::test]
async fn select_unknown_signal_clears_selection() {
    let (_backend, mut workspace) = submitted_workspace().await;

    workspace.select_signal("sig-404");

    let result = workspace.result().unwrap();
    assert!(result.selected_signal.is_none());
    assert!(result.script_output.is_none());
}

#[tokio::test]
async fn select_signal_without_result_is_a_noop() {
    let (_backend, mut workspace) = workspace();
    workspace.select_signal("sig-1");
    assert!(workspace.result().is_none());
    assert!(workspace.error_message().is_none());
}

// ---------------------------------------------------------------------------
// Script generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_script_populates_output_and_keeps_selection() {
    let (backend, mut workspace) = submitted_workspace().await;
    backend.queue_script(Ok(script_fixture()));

    workspace.generate_script().await;

    assert!(workspace.error_message().is_none());
    let result = workspace.result().unwrap();
    assert_eq!(
        result.script_output.as_ref().and_then(|s| s.title()),
        Some("Generated title")
    );
    assert_eq!(
        result.selected_signal.as_ref().map(|s| s.signal_id.as_str()),
        Some("sig-1")
    );

    // the selected signal goes back to the backend unmodified
    let requests = backend.script_requests.lock().unwrap();
    assert_eq!(requests[0].signal_id, "sig-1");
    assert_eq!(requests[0].target_length_sec, 180);
    assert_eq!(requests[0].style, "informative");
    assert_eq!(
        serde_json::to_value(&requests[0].signal).unwrap()["demand_statement"],
        json!("go deeper")
    );
}

#[tokio::test]
async fn generate_script_without_submission_is_a_state_error() {
    let (backend, mut workspace) = workspace();

    workspace.generate_script().await;

    let message = workspace.error_message().expect("state error message");
    assert!(message.starts_with("State error"), "got: {message}");
    assert_eq!(backend.script_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn script_failure_preserves_result_and_is_retryable() {
    let (backend, mut workspace) = submitted_workspace().await;
    backend.queue_script(Err(backend_error("script model overloaded")));

    workspace.generate_script().await;

    assert_eq!(workspace.error_message(), Some("script model overloaded"));
    let result = workspace.result().unwrap();
    assert!(result.script_output.is_none());
    assert_eq!(
        result.selected_signal.as_ref().map(|s| s.signal_id.as_str()),
        Some("sig-1")
    );

    // retrying the same action succeeds and clears the message
    backend.queue_script(Ok(script_fixture()));
    workspace.generate_script().await;
    assert!(workspace.error_message().is_none());
    assert!(workspace.result().unwrap().script_output.is_some());
}

#[tokio::test]
async fn selection_cleared_then_generate_is_a_state_error() {
    let (backend, mut workspace) = submitted_workspace().await;
    workspace.select_signal("sig-404");

    workspace.generate_script().await;

    assert!(workspace.error_message().unwrap().starts_with("State error"));
    assert_eq!(backend.script_calls.load(Ordering::SeqCst), 0);
}
