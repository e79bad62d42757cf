//! PublishReport - 成功時の集計結果

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

use super::ids::ServerId;
use super::topic::TopicPath;

/// Aggregate statistics of a successful publish.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub topic: TopicPath,
    pub messages: usize,
    pub bytes: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
    /// Index-aligned with the published batch.
    pub server_ids: Vec<ServerId>,
}

fn as_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_micros() as f64 / 1000.0)
}

impl fmt::Display for PublishReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "published {} bytes to {} across {} message(s) in {:?}",
            self.bytes, self.topic, self.messages, self.elapsed
        )
    }
}
