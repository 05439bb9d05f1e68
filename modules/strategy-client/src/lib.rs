pub mod error;
pub mod types;

pub use error::{Result, StrategyError};
pub use types::{
    CollectedComment, CommentCollectionRequest, CommentCollectionResult, Script, ScriptOutput,
    ScriptRequest, Segment, Signal, SignalComment, SignalFilters, SignalOutput, SignalRequest,
    SignalVideo, StructuredSegment, VideoComments,
};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const COMMENTS_PATH: &str = "/api/v1/strategy/youtube/comments";
const SIGNALS_PATH: &str = "/api/v1/strategy/signals/from-comments";
const SCRIPTS_PATH: &str = "/api/v1/strategy/scripts/from-signal";

/// Fallback messages when a non-2xx body carries no parseable `detail`.
const COMMENTS_DEFAULT_DETAIL: &str = "Comment collection request failed.";
const SIGNALS_DEFAULT_DETAIL: &str = "Signal generation request failed.";
const SCRIPTS_DEFAULT_DETAIL: &str = "Script generation request failed.";

/// Error body shape used by the strategy backend for non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

pub struct StrategyClient {
    client: reqwest::Client,
    base_url: String,
}

impl StrategyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Collect recent comments for a channel (stage 1).
    pub async fn collect_comments(
        &self,
        request: &CommentCollectionRequest,
    ) -> Result<CommentCollectionResult> {
        tracing::info!(
            channel_handle = %request.channel_handle,
            max_videos = request.max_videos,
            "Collecting YouTube comments"
        );

        let result: CommentCollectionResult = self
            .post_json(COMMENTS_PATH, request, COMMENTS_DEFAULT_DETAIL)
            .await?;

        tracing::info!(
            channel_id = %result.channel_id,
            videos = result.videos.len(),
            "Comments collected"
        );
        Ok(result)
    }

    /// Extract demand signals from collected comments (stage 2).
    pub async fn signals_from_comments(&self, request: &SignalRequest) -> Result<SignalOutput> {
        tracing::info!(videos = request.videos.len(), "Generating signals from comments");

        let output: SignalOutput = self
            .post_json(SIGNALS_PATH, request, SIGNALS_DEFAULT_DETAIL)
            .await?;

        tracing::info!(signals = output.signals.len(), "Signals generated");
        Ok(output)
    }

    /// Generate a video script from one selected signal (stage 3).
    pub async fn script_from_signal(&self, request: &ScriptRequest) -> Result<ScriptOutput> {
        tracing::info!(signal_id = %request.signal_id, "Generating script from signal");

        let output: ScriptOutput = self
            .post_json(SCRIPTS_PATH, request, SCRIPTS_DEFAULT_DETAIL)
            .await?;

        tracing::info!(
            title = output.title().unwrap_or("-"),
            "Script generated"
        );
        Ok(output)
    }

    async fn post_json<Req, Resp>(
        &self,
        path: &str,
        body: &Req,
        default_detail: &str,
    ) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.post(&url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| default_detail.to_string());
            tracing::warn!(status = status.as_u16(), path, "Strategy backend returned an error");
            return Err(StrategyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}
