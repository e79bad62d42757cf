//! PublishDriver - publish パイプライン全体
//!
//! # フロー
//! 1. データ引数（または stdin）を payload に decode
//! 2. MessageBatch として検証（空・重複）
//! 3. topic を解決し、存在を確認
//! 4. publish_all で並行 publish
//! 5. PublishReport を返す
//!
//! この層ではリトライしない。リトライは TopicClient の実装（SDK）の責務。

use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use super::dispatch::{DispatchOptions, publish_all};
use super::input::read_payloads;
use crate::domain::{MessageBatch, PublishError, PublishReport, TopicPath};
use crate::ports::TopicClient;

/// Positional arguments of a publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub topic: String,
    pub data: String,
}

impl PublishRequest {
    /// Both arguments are required; empty strings count as missing.
    pub fn new(topic: Option<String>, data: Option<String>) -> Result<Self, PublishError> {
        let topic = topic
            .filter(|t| !t.is_empty())
            .ok_or(PublishError::MissingTopic)?;
        let data = data
            .filter(|d| !d.is_empty())
            .ok_or(PublishError::MissingData)?;
        Ok(Self { topic, data })
    }
}

pub struct PublishDriver {
    client: Arc<dyn TopicClient>,
    project: String,
    options: DispatchOptions,
}

impl PublishDriver {
    pub fn new(client: Arc<dyn TopicClient>, project: impl Into<String>, options: DispatchOptions) -> Self {
        Self {
            client,
            project: project.into(),
            options,
        }
    }

    /// Short names of the topics in the active project.
    pub async fn list_topics(&self, cancel: &CancellationToken) -> Result<Vec<String>, PublishError> {
        let topics = or_cancelled(cancel, self.client.list_topics()).await?;
        Ok(topics.into_iter().map(|t| t.name().to_string()).collect())
    }

    /// Run the full pipeline for one request.
    ///
    /// `stdin` is only read when the data argument is `-`.
    pub async fn publish<R>(
        &self,
        request: &PublishRequest,
        stdin: R,
        cancel: &CancellationToken,
    ) -> Result<PublishReport, PublishError>
    where
        R: AsyncRead + Unpin,
    {
        let payloads = or_cancelled(cancel, read_payloads(&request.data, stdin)).await?;
        let batch = MessageBatch::new(payloads)?;

        let topic = TopicPath::resolve(&request.topic, &self.project)?;
        if !or_cancelled(cancel, self.client.topic_exists(&topic)).await? {
            return Err(PublishError::TopicNotFound(topic.to_string()));
        }

        if batch.len() > 1 {
            tracing::info!(messages = batch.len(), "publishing {} messages", batch.len());
        }

        let start = Instant::now();
        let publisher = or_cancelled(cancel, self.client.publisher(&topic)).await?;
        let result = publish_all(Arc::clone(&publisher), &batch, &self.options, cancel).await;
        publisher.shutdown().await;
        let server_ids = result?;

        Ok(PublishReport {
            topic,
            messages: batch.len(),
            bytes: batch.total_bytes(),
            elapsed: start.elapsed(),
            server_ids,
        })
    }
}

/// Resolve `fut`, or fail with `Cancelled` once `cancel` fires.
///
/// An already-cancelled token wins without polling `fut`.
pub async fn or_cancelled<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, PublishError>
where
    F: Future<Output = Result<T, PublishError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PublishError::Cancelled),
        result = fut => result,
    }
}
