//! Dispatch - メッセージごとの並行 publish
//!
//! # フロー
//! 1. メッセージごとに task を spawn（共有の CancellationToken に紐づく）
//! 2. 各 task は 1 件だけ publish して server ID を待つ
//! 3. 全 task の終了を待つ（失敗があっても途中で return しない）
//! 4. 結果は index ごとの slot に格納し、最初に完了した失敗を返す
//!
//! 複数のメッセージが同時に失敗した場合、報告される index は完了順に依存する。

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::domain::{MessageBatch, PublishError, ServerId};
use crate::ports::MessagePublisher;

/// Tuning for the fan-out.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Upper bound on publishes in flight at once; `None` means one per message.
    pub max_in_flight: Option<NonZeroUsize>,
    /// Abort the remaining publishes once one has failed.
    pub cancel_on_error: bool,
}

impl DispatchOptions {
    fn permits(&self, messages: usize) -> usize {
        match self.max_in_flight {
            Some(limit) => limit.get().min(messages),
            None => messages,
        }
        .max(1)
    }
}

/// Publish every message of `batch` concurrently.
///
/// Returns the server IDs index-aligned with the batch, or the first failure
/// to complete, annotated with its message index.
pub async fn publish_all(
    publisher: Arc<dyn MessagePublisher>,
    batch: &MessageBatch,
    options: &DispatchOptions,
    cancel: &CancellationToken,
) -> Result<Vec<ServerId>, PublishError> {
    let cancel = cancel.child_token();
    let permits = Arc::new(Semaphore::new(options.permits(batch.len())));

    let mut tasks = JoinSet::new();
    for (index, payload) in batch.iter().enumerate() {
        let publisher = Arc::clone(&publisher);
        let permits = Arc::clone(&permits);
        let cancel = cancel.clone();
        let payload = payload.to_vec();

        tasks.spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(PublishError::Cancelled),
                outcome = publish_one(publisher, permits, payload) => outcome,
            };
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<ServerId>> = vec![None; batch.len()];
    let mut first_error: Option<PublishError> = None;

    while let Some(joined) = tasks.join_next().await {
        let failure = match joined {
            Ok((index, Ok(id))) => {
                tracing::info!(index, %id, "published msg");
                slots[index] = Some(id);
                continue;
            }
            Ok((index, Err(cause))) => PublishError::Message {
                index,
                source: Box::new(cause),
            },
            Err(join_error) => PublishError::Task(join_error.to_string()),
        };

        if first_error.is_some() {
            tracing::debug!(error = %failure, "additional publish failure");
            continue;
        }
        tracing::debug!(error = %failure, "first publish failure");
        if options.cancel_on_error {
            cancel.cancel();
        }
        first_error = Some(failure);
    }

    if let Some(err) = first_error {
        return Err(err);
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(index, id)| {
            id.ok_or_else(|| PublishError::Message {
                index,
                source: Box::new(PublishError::Task("no result recorded".into())),
            })
        })
        .collect()
}

async fn publish_one(
    publisher: Arc<dyn MessagePublisher>,
    permits: Arc<Semaphore>,
    payload: Vec<u8>,
) -> Result<ServerId, PublishError> {
    // the semaphore is never closed
    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|e| PublishError::Task(e.to_string()))?;
    publisher.publish(payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TopicPath;
    use crate::impls::InMemoryTopicClient;
    use crate::ports::TopicClient;
    use std::time::Duration;

    fn batch(payloads: &[&[u8]]) -> MessageBatch {
        MessageBatch::new(payloads.iter().map(|p| p.to_vec()).collect()).unwrap()
    }

    async fn publisher(client: &InMemoryTopicClient) -> Arc<dyn MessagePublisher> {
        client.publisher(&TopicPath::new("p1", "t1")).await.unwrap()
    }

    #[tokio::test]
    async fn ids_are_index_aligned() {
        let client = InMemoryTopicClient::new("p1").with_topic("t1");
        let batch = batch(&[b"a", b"b", b"c"]);

        let ids = publish_all(
            publisher(&client).await,
            &batch,
            &DispatchOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(ids.len(), 3);
        let mut published = client.published(&TopicPath::new("p1", "t1")).await;
        published.sort();
        assert_eq!(published, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[tokio::test]
    async fn failure_names_message_index_and_others_still_finish() {
        let client = InMemoryTopicClient::new("p1").with_topic("t1").fail_on(b"bad");
        let batch = batch(&[b"ok-1", b"bad", b"ok-2"]);

        let err = publish_all(
            publisher(&client).await,
            &batch,
            &DispatchOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.message_index(), Some(1));
        assert_eq!(err.to_string(), "publish msg 1: injected failure");
        assert_eq!(client.publish_attempts(), 3);
        assert_eq!(client.published(&TopicPath::new("p1", "t1")).await.len(), 2);
    }

    #[tokio::test]
    async fn max_in_flight_bounds_concurrency() {
        let client = InMemoryTopicClient::new("p1")
            .with_topic("t1")
            .with_latency(Duration::from_millis(20));
        let batch = batch(&[b"1", b"2", b"3", b"4", b"5", b"6"]);
        let options = DispatchOptions {
            max_in_flight: NonZeroUsize::new(2),
            ..DispatchOptions::default()
        };

        publish_all(publisher(&client).await, &batch, &options, &CancellationToken::new())
            .await
            .unwrap();

        assert!(client.max_in_flight() <= 2);
        assert_eq!(client.publish_attempts(), 6);
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_publishes() {
        let client = InMemoryTopicClient::new("p1")
            .with_topic("t1")
            .with_latency(Duration::from_secs(30));
        let batch = batch(&[b"1", b"2"]);
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = publish_all(publisher(&client).await, &batch, &DispatchOptions::default(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PublishError::Message { ref source, .. } if matches!(**source, PublishError::Cancelled)
        ));
        assert!(client.published(&TopicPath::new("p1", "t1")).await.is_empty());
    }

    #[tokio::test]
    async fn cancelled_token_sends_nothing() {
        let client = InMemoryTopicClient::new("p1").with_topic("t1");
        let batch = batch(&[b"1", b"2", b"3"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = publish_all(publisher(&client).await, &batch, &DispatchOptions::default(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PublishError::Message { ref source, .. } if matches!(**source, PublishError::Cancelled)
        ));
        assert_eq!(client.publish_attempts(), 0);
        assert!(client.published(&TopicPath::new("p1", "t1")).await.is_empty());
    }

    #[tokio::test]
    async fn cancel_on_error_stops_slow_publishes() {
        let client = InMemoryTopicClient::new("p1").with_topic("t1").fail_on(b"bad");
        let slow = InMemoryTopicClient::new("p1")
            .with_topic("t1")
            .with_latency(Duration::from_secs(30));
        let batch = batch(&[b"bad", b"slow"]);
        let options = DispatchOptions {
            max_in_flight: None,
            cancel_on_error: true,
        };

        // "bad" fails immediately; "slow" would otherwise wait 30s
        let publisher = Arc::new(Split {
            fast: publisher(&client).await,
            slow: publisher(&slow).await,
        });
        let err = tokio::time::timeout(
            Duration::from_secs(5),
            publish_all(publisher, &batch, &options, &CancellationToken::new()),
        )
        .await
        .expect("fail-fast dispatch should not wait for slow publishes")
        .unwrap_err();

        assert_eq!(err.message_index(), Some(0));
    }

    /// Routes `slow` to a high-latency publisher and everything else to `fast`.
    struct Split {
        fast: Arc<dyn MessagePublisher>,
        slow: Arc<dyn MessagePublisher>,
    }

    #[async_trait::async_trait]
    impl MessagePublisher for Split {
        async fn publish(&self, payload: Vec<u8>) -> Result<ServerId, PublishError> {
            if payload == b"slow" {
                self.slow.publish(payload).await
            } else {
                self.fast.publish(payload).await
            }
        }

        async fn shutdown(&self) {}
    }
}
