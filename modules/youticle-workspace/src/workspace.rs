//! Workspace orchestration.
//!
//! One `Workspace` per user session. State advances through strictly
//! sequential async stages (collect → signals, then optionally script); the
//! in-flight flags guard re-entry instead of cancellation, and signal
//! re-selection is a pure synchronous update.

use tracing::info;

use strategy_client::{
    CommentCollectionRequest, ScriptOutput, ScriptRequest, Signal, SignalOutput, SignalRequest,
    StrategyError,
};

use crate::error::WorkspaceError;
use crate::handle;
use crate::traits::StrategyBackend;

/// Comments requested per video in stage 1. Fixed by the product, not
/// user-tunable.
pub const MAX_COMMENTS_PER_VIDEO: u32 = 10;

/// An immutable submission built from validated user input.
#[derive(Debug, Clone)]
pub struct ChannelQuery {
    pub channel_handle: String,
    pub max_videos: u32,
}

impl ChannelQuery {
    pub fn new(channel_handle: impl Into<String>, max_videos: u32) -> Self {
        Self {
            channel_handle: channel_handle.into(),
            max_videos,
        }
    }
}

/// The accumulating aggregate a submission builds up: channel metadata and
/// all signals after stage 2, a script after stage 3.
#[derive(Debug, Clone)]
pub struct WorkspaceResult {
    pub channel_handle: String,
    pub channel_id: String,
    pub channel_name: Option<String>,
    pub channel_thumbnail_url: Option<String>,
    pub subscriber_count: Option<i64>,
    pub video_count: i64,
    pub signal_output: SignalOutput,
    /// Always `None` or a member of `signal_output.signals`.
    pub selected_signal: Option<Signal>,
    /// Bound to exactly one signal; cleared whenever the selection changes.
    pub script_output: Option<ScriptOutput>,
}

pub struct Workspace<B: StrategyBackend> {
    backend: B,
    result: Option<WorkspaceResult>,
    error_message: Option<String>,
    is_submitting: bool,
    is_generating_script: bool,
}

impl<B: StrategyBackend> Workspace<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            result: None,
            error_message: None,
            is_submitting: false,
            is_generating_script: false,
        }
    }

    pub fn result(&self) -> Option<&WorkspaceResult> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn is_generating_script(&self) -> bool {
        self.is_generating_script
    }

    pub fn signals(&self) -> &[Signal] {
        self.result
            .as_ref()
            .map(|result| result.signal_output.signals.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_signal(&self) -> Option<&Signal> {
        self.result.as_ref()?.selected_signal.as_ref()
    }

    /// Run the two-stage submission pipeline. Invalid handles are rejected
    /// before any network call, leaving any prior result in place. A valid
    /// submission discards the prior result and error up front; a failure at
    /// either stage keeps no partial result.
    pub async fn submit(&mut self, query: ChannelQuery) {
        if self.is_submitting {
            return;
        }
        if !handle::is_valid_handle(&query.channel_handle) {
            self.error_message = Some(
                WorkspaceError::Validation(format!(
                    "'{}' is not a valid channel handle",
                    query.channel_handle
                ))
                .to_string(),
            );
            return;
        }

        self.is_submitting = true;
        self.error_message = None;
        self.result = None;

        match self.run_submission(&query).await {
            Ok(result) => {
                info!(
                    channel_id = %result.channel_id,
                    signals = result.signal_output.signals.len(),
                    "Workspace ready"
                );
                self.result = Some(result);
            }
            Err(err) => self.error_message = Some(err.to_string()),
        }
        self.is_submitting = false;
    }

    async fn run_submission(&self, query: &ChannelQuery) -> Result<WorkspaceResult, WorkspaceError> {
        // Stage 1 must fully resolve before stage 2 is requested.
        let collection = self
            .backend
            .collect_comments(&CommentCollectionRequest {
                channel_handle: query.channel_handle.clone(),
                max_videos: query.max_videos,
                max_comments_per_video: MAX_COMMENTS_PER_VIDEO,
            })
            .await
            .map_err(backend_error)?;

        let signal_request = SignalRequest::new(collection.to_signal_videos());
        let signal_output = self
            .backend
            .signals_from_comments(&signal_request)
            .await
            .map_err(backend_error)?;

        // An empty signal list is a valid terminal state: ready, nothing
        // selected.
        let selected_signal = signal_output.signals.first().cloned();

        Ok(WorkspaceResult {
            channel_handle: collection.channel_handle,
            channel_id: collection.channel_id,
            channel_name: collection.channel_name,
            channel_thumbnail_url: collection.channel_thumbnail_url,
            subscriber_count: collection.subscriber_count,
            video_count: collection.video_count,
            signal_output,
            selected_signal,
            script_output: None,
        })
    }

    /// Re-select a signal by id. Pure and synchronous — no network call. A
    /// miss clears the selection; either way any generated script is dropped,
    /// because a script is bound to exactly one signal.
    pub fn select_signal(&mut self, signal_id: &str) {
        let Some(result) = self.result.as_mut() else {
            return;
        };
        if result.signal_output.signals.is_empty() {
            return;
        }
        result.selected_signal = result
            .signal_output
            .signals
            .iter()
            .find(|signal| signal.signal_id == signal_id)
            .cloned();
        result.script_output = None;
    }

    /// Generate a script for the currently selected signal. Failure is
    /// isolated to this action: the existing result, selection, and any
    /// previous script stay untouched.
    pub async fn generate_script(&mut self) {
        if self.is_generating_script {
            return;
        }
        let selected = self
            .result
            .as_ref()
            .and_then(|result| result.selected_signal.clone())
            .filter(|signal| !signal.signal_id.is_empty());
        let Some(signal) = selected else {
            self.error_message = Some(
                WorkspaceError::State("no signal selected for script generation".to_string())
                    .to_string(),
            );
            return;
        };

        self.is_generating_script = true;
        self.error_message = None;

        let request = ScriptRequest::for_signal(&signal);
        match self.backend.script_from_signal(&request).await {
            Ok(script_output) => {
                if let Some(result) = self.result.as_mut() {
                    result.script_output = Some(script_output);
                }
            }
            Err(err) => self.error_message = Some(backend_error(err).to_string()),
        }
        self.is_generating_script = false;
    }
}

fn backend_error(err: StrategyError) -> WorkspaceError {
    WorkspaceError::Backend(err.to_string())
}
