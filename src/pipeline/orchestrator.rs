//! Per-message processing: detect, resolve, merge, format, post.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::common::error::{PipelineError, SinkError};
use crate::common::{MergedRecord, MessageKey, SourceMessage};
use crate::extractors::ExtractorRegistry;
use crate::links::UrlDetector;
use crate::pipeline::aggregator::aggregate;
use crate::pipeline::formatter::compose_post;
use crate::pipeline::guard::ProcessingGuard;

/// Destination for composed posts.
#[async_trait]
pub trait PostSink: Send + Sync {
    async fn post(&self, body: &str) -> Result<(), SinkError>;
}

/// The link-to-record pipeline.
///
/// Owns no per-message state; only the guard is shared between triggers.
pub struct LinkPipeline {
    detector: UrlDetector,
    registry: ExtractorRegistry,
    guard: Arc<dyn ProcessingGuard>,
    footer: Option<String>,
}

impl LinkPipeline {
    pub fn new(
        detector: UrlDetector,
        registry: ExtractorRegistry,
        guard: Arc<dyn ProcessingGuard>,
    ) -> Self {
        Self {
            detector,
            registry,
            guard,
            footer: None,
        }
    }

    /// Line posted once after a batch of records.
    pub fn with_footer(mut self, footer: Option<String>) -> Self {
        self.footer = footer;
        self
    }

    /// Resolve and merge the links of `text`. No idempotency involved.
    ///
    /// URLs are resolved concurrently; `join_all` yields results in URL order,
    /// which keeps description precedence and link order deterministic.
    pub async fn records(&self, text: &str) -> Vec<MergedRecord> {
        let spans = self.detector.detect(text);
        if spans.is_empty() {
            return Vec::new();
        }

        debug!("Resolving {} URLs", spans.len());
        let resolved = join_all(spans.iter().map(|span| self.registry.resolve(span))).await;

        aggregate(resolved.into_iter().flatten())
    }

    /// Composed post bodies for `message`, one per merged record.
    pub async fn compose(&self, message: &SourceMessage) -> Vec<String> {
        self.records(&message.text)
            .await
            .iter()
            .map(|record| compose_post(record, message))
            .collect()
    }

    /// Process `message` at most once, posting its records to `sink`.
    ///
    /// Returns the posted bodies; empty when the message was already handled
    /// or produced nothing (in which case it stays eligible for retry).
    pub async fn process(
        &self,
        message: &SourceMessage,
        sink: &dyn PostSink,
    ) -> Result<Vec<String>, PipelineError> {
        let key = message.key;

        if self.detector.detect(&message.text).is_empty() {
            info!("Skipping message {}: no links", key);
            return Ok(Vec::new());
        }

        if !self.guard.check_and_reserve(key).await? {
            info!("Skipping message {}: already processed", key);
            return Ok(Vec::new());
        }

        let posts = self.compose(message).await;
        if posts.is_empty() {
            info!("No links in message {} resolved to a game", key);
            self.guard.release(key).await?;
            return Ok(Vec::new());
        }

        let mut posted = Vec::with_capacity(posts.len());
        for body in posts {
            if let Err(e) = sink.post(&body).await {
                error!("Failed to post record for message {}: {}", key, e);
                self.settle_after_failure(key, !posted.is_empty()).await;
                return Err(e.into());
            }
            posted.push(body);
        }

        if let Some(footer) = &self.footer {
            if let Err(e) = sink.post(footer).await {
                warn!("Failed to post footer for message {}: {}", key, e);
            }
        }

        self.guard.commit(key).await?;
        info!("Posted {} records for message {}", posted.len(), key);
        Ok(posted)
    }

    /// Commit if anything reached the channel, otherwise release.
    async fn settle_after_failure(&self, key: MessageKey, anything_posted: bool) {
        let result = if anything_posted {
            self.guard.commit(key).await
        } else {
            self.guard.release(key).await
        };

        if let Err(e) = result {
            error!("Failed to settle reservation for message {}: {}", key, e);
        }
    }
}
