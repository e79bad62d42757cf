//! GcpTopicClient - google-cloud-pubsub を使う TopicClient
//!
//! 接続・認証・batching・retry はすべて SDK に任せる。
//! `PUBSUB_EMULATOR_HOST` が設定されていれば SDK が emulator に接続する。

use std::sync::Arc;

use async_trait::async_trait;
use google_cloud_googleapis::pubsub::v1::PubsubMessage;
use google_cloud_pubsub::client::{Client, ClientConfig};
use google_cloud_pubsub::publisher::Publisher;
use tokio::sync::RwLock;

use crate::domain::{PublishError, ServerId, TopicPath};
use crate::ports::{MessagePublisher, TopicClient};

pub struct GcpTopicClient {
    client: Client,
}

impl GcpTopicClient {
    pub async fn connect(project: &str) -> Result<Self, PublishError> {
        let config = ClientConfig {
            project_id: Some(project.to_string()),
            ..ClientConfig::default()
        }
        .with_auth()
        .await
        .map_err(|e| PublishError::Backend(format!("authenticate: {e}")))?;
        let client = Client::new(config)
            .await
            .map_err(|e| PublishError::Backend(format!("create pubsub client: {e}")))?;

        tracing::debug!(project, "connected to pubsub");
        Ok(Self { client })
    }
}

#[async_trait]
impl TopicClient for GcpTopicClient {
    async fn topic_exists(&self, topic: &TopicPath) -> Result<bool, PublishError> {
        self.client
            .topic(&topic.to_string())
            .exists(None)
            .await
            .map_err(PublishError::backend)
    }

    async fn list_topics(&self) -> Result<Vec<TopicPath>, PublishError> {
        let names = self
            .client
            .get_topics(None)
            .await
            .map_err(PublishError::backend)?;
        names.iter().map(|name| name.parse()).collect()
    }

    async fn publisher(&self, topic: &TopicPath) -> Result<Arc<dyn MessagePublisher>, PublishError> {
        let publisher = self.client.topic(&topic.to_string()).new_publisher(None);
        Ok(Arc::new(GcpPublisher {
            publisher: RwLock::new(publisher),
        }))
    }
}

/// Wraps the SDK publisher; `shutdown` needs `&mut`, publishes only `&`.
struct GcpPublisher {
    publisher: RwLock<Publisher>,
}

#[async_trait]
impl MessagePublisher for GcpPublisher {
    async fn publish(&self, payload: Vec<u8>) -> Result<ServerId, PublishError> {
        let message = PubsubMessage {
            data: payload,
            ..PubsubMessage::default()
        };
        // lock is released before waiting on the acknowledgement
        let awaiter = self.publisher.read().await.publish(message).await;
        let id = awaiter.get().await.map_err(PublishError::backend)?;
        Ok(ServerId::from(id))
    }

    async fn shutdown(&self) {
        self.publisher.write().await.shutdown().await;
    }
}
