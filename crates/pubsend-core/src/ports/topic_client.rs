//! TopicClient port - Pub/Sub の管理操作と publish
//!
//! # 実装
//! - `GcpTopicClient`: google-cloud-pubsub（本番用）
//! - `InMemoryTopicClient`: テスト・開発用

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{PublishError, ServerId, TopicPath};

/// Topic-level operations against the publish/subscribe system.
///
/// Retry, batching and connection handling belong to the implementation.
#[async_trait]
pub trait TopicClient: Send + Sync {
    async fn topic_exists(&self, topic: &TopicPath) -> Result<bool, PublishError>;

    /// Topics of the client's project, fully qualified.
    async fn list_topics(&self) -> Result<Vec<TopicPath>, PublishError>;

    async fn publisher(&self, topic: &TopicPath) -> Result<Arc<dyn MessagePublisher>, PublishError>;
}

/// Publishes single messages to one topic.
///
/// `publish` resolves once the server has acknowledged the message.
/// Shared across dispatch tasks, so `&self` only.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, payload: Vec<u8>) -> Result<ServerId, PublishError>;

    /// Stop background workers. Called once after every publish has completed.
    async fn shutdown(&self);
}
