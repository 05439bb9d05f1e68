//! Trait abstraction over the strategy backend.
//!
//! The workspace state machine only needs the three calls, so it takes them
//! through one trait. Tests drive the workspace with an in-memory mock —
//! no network, no backend process.

use async_trait::async_trait;

use strategy_client::{
    CommentCollectionRequest, CommentCollectionResult, Result, ScriptOutput, ScriptRequest,
    SignalOutput, SignalRequest, StrategyClient,
};

#[async_trait]
pub trait StrategyBackend: Send + Sync {
    /// Collect recent comments for a channel (stage 1).
    async fn collect_comments(
        &self,
        request: &CommentCollectionRequest,
    ) -> Result<CommentCollectionResult>;

    /// Extract demand signals from collected comments (stage 2).
    async fn signals_from_comments(&self, request: &SignalRequest) -> Result<SignalOutput>;

    /// Generate a video script from one selected signal (stage 3).
    async fn script_from_signal(&self, request: &ScriptRequest) -> Result<ScriptOutput>;
}

#[async_trait]
impl<B: StrategyBackend> StrategyBackend for std::sync::Arc<B> {
    async fn collect_comments(
        &self,
        request: &CommentCollectionRequest,
    ) -> Result<CommentCollectionResult> {
        (**self).collect_comments(request).await
    }

    async fn signals_from_comments(&self, request: &SignalRequest) -> Result<SignalOutput> {
        (**self).signals_from_comments(request).await
    }

    async fn script_from_signal(&self, request: &ScriptRequest) -> Result<ScriptOutput> {
        (**self).script_from_signal(request).await
    }
}

#[async_trait]
impl StrategyBackend for StrategyClient {
    async fn collect_comments(
        &self,
        request: &CommentCollectionRequest,
    ) -> Result<CommentCollectionResult> {
        StrategyClient::collect_comments(self, request).await
    }

    async fn signals_from_comments(&self, request: &SignalRequest) -> Result<SignalOutput> {
        StrategyClient::signals_from_comments(self, request).await
    }

    async fn script_from_signal(&self, request: &ScriptRequest) -> Result<ScriptOutput> {
        StrategyClient::script_from_signal(self, request).await
    }
}
