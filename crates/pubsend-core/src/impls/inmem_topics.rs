//! InMemoryTopicClient - 開発・テスト用の TopicClient
//!
//! # 学習ポイント
//! - tokio::sync::Mutex で topic ごとの受信メッセージを管理
//! - AtomicUsize で同時 publish 数の最大値を観測
//! - 失敗・遅延の注入で driver のエラー経路をテストできる

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use ulid::Ulid;

use crate::domain::{PublishError, ServerId, TopicPath};
use crate::ports::{MessagePublisher, TopicClient};

#[derive(Default)]
struct Shared {
    /// topic ごとに受信した payload（受信順）
    topics: Mutex<HashMap<TopicPath, Vec<Vec<u8>>>>,
    failing: HashSet<Vec<u8>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    attempts: AtomicUsize,
    shut_down: AtomicBool,
}

/// In-memory publish/subscribe system scoped to one project.
///
/// # 使用例
/// ```ignore
/// let client = InMemoryTopicClient::new("p1")
///     .with_topic("t1")
///     .fail_on(b"boom");
/// ```
pub struct InMemoryTopicClient {
    project: String,
    shared: Arc<Shared>,
}

impl InMemoryTopicClient {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            shared: Arc::new(Shared::default()),
        }
    }

    /// Create a topic in the client's own project.
    pub fn with_topic(self, name: &str) -> Self {
        let topic = TopicPath::new(self.project.clone(), name);
        self.with_topic_path(topic)
    }

    pub fn with_topic_path(mut self, topic: TopicPath) -> Self {
        self.shared_mut().topics.get_mut().entry(topic).or_default();
        self
    }

    /// Every publish of exactly `payload` fails.
    pub fn fail_on(mut self, payload: &[u8]) -> Self {
        self.shared_mut().failing.insert(payload.to_vec());
        self
    }

    /// Delay before each acknowledgement.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.shared_mut().latency = Some(latency);
        self
    }

    fn shared_mut(&mut self) -> &mut Shared {
        Arc::get_mut(&mut self.shared).expect("configure the client before handing out publishers")
    }

    /// Payloads acknowledged on `topic`, in acknowledgement order.
    pub async fn published(&self, topic: &TopicPath) -> Vec<Vec<u8>> {
        let topics = self.shared.topics.lock().await;
        topics.get(topic).cloned().unwrap_or_default()
    }

    /// Highest number of publishes observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.shared.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of publish calls, successful or not.
    pub fn publish_attempts(&self) -> usize {
        self.shared.attempts.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.shut_down.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TopicClient for InMemoryTopicClient {
    async fn topic_exists(&self, topic: &TopicPath) -> Result<bool, PublishError> {
        Ok(self.shared.topics.lock().await.contains_key(topic))
    }

    async fn list_topics(&self) -> Result<Vec<TopicPath>, PublishError> {
        let topics = self.shared.topics.lock().await;
        let mut listed: Vec<TopicPath> = topics
            .keys()
            .filter(|t| t.project() == self.project)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(listed)
    }

    async fn publisher(&self, topic: &TopicPath) -> Result<Arc<dyn MessagePublisher>, PublishError> {
        Ok(Arc::new(InMemoryPublisher {
            topic: topic.clone(),
            shared: self.shared.clone(),
        }))
    }
}

struct InMemoryPublisher {
    topic: TopicPath,
    shared: Arc<Shared>,
}

impl InMemoryPublisher {
    async fn deliver(&self, payload: Vec<u8>) -> Result<ServerId, PublishError> {
        if let Some(latency) = self.shared.latency {
            tokio::time::sleep(latency).await;
        }
        if self.shared.failing.contains(&payload) {
            return Err(PublishError::Backend("injected failure".into()));
        }

        let mut topics = self.shared.topics.lock().await;
        let messages = topics
            .get_mut(&self.topic)
            .ok_or_else(|| PublishError::TopicNotFound(self.topic.to_string()))?;
        messages.push(payload);
        Ok(ServerId::new(Ulid::new().to_string()))
    }
}

#[async_trait]
impl MessagePublisher for InMemoryPublisher {
    async fn publish(&self, payload: Vec<u8>) -> Result<ServerId, PublishError> {
        self.shared.attempts.fetch_add(1, Ordering::SeqCst);
        let now = self.shared.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = self.deliver(payload).await;

        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn shutdown(&self) {
        self.shared.shut_down.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_records_payload_and_returns_id() {
        let client = InMemoryTopicClient::new("p1").with_topic("t1");
        let topic = TopicPath::new("p1", "t1");

        let publisher = client.publisher(&topic).await.unwrap();
        let id = publisher.publish(b"hello".to_vec()).await.unwrap();

        assert!(!id.as_str().is_empty());
        assert_eq!(client.published(&topic).await, vec![b"hello".to_vec()]);
        assert_eq!(client.publish_attempts(), 1);
    }

    #[tokio::test]
    async fn unknown_topic_does_not_exist() {
        let client = InMemoryTopicClient::new("p1").with_topic("t1");
        assert!(client.topic_exists(&TopicPath::new("p1", "t1")).await.unwrap());
        assert!(!client.topic_exists(&TopicPath::new("p1", "t2")).await.unwrap());
        assert!(!client.topic_exists(&TopicPath::new("p2", "t1")).await.unwrap());
    }

    #[tokio::test]
    async fn injected_failure_is_returned() {
        let client = InMemoryTopicClient::new("p1").with_topic("t1").fail_on(b"boom");
        let topic = TopicPath::new("p1", "t1");
        let publisher = client.publisher(&topic).await.unwrap();

        let err = publisher.publish(b"boom".to_vec()).await.unwrap_err();
        assert!(matches!(err, PublishError::Backend(_)));
        assert!(client.published(&topic).await.is_empty());
    }

    #[tokio::test]
    async fn list_topics_is_scoped_to_project_and_sorted() {
        let client = InMemoryTopicClient::new("p1")
            .with_topic("zeta")
            .with_topic("alpha")
            .with_topic_path(TopicPath::new("p2", "elsewhere"));

        let names: Vec<String> = client
            .list_topics()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
