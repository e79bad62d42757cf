//! Errors - エラー型と分類
//!
//! すべてのエラーはプロセスにとって致命的（この層ではリトライしない）。
//! SDK 固有のエラー型は `impls` の境界で文字列に変換し、core の API には漏らさない。

use thiserror::Error;

/// ErrorKind は失敗の分類
///
/// - Input: 引数・入力データの問題（再実行しても同じ結果）
/// - Resolution: project / topic が見つからない
/// - Delivery: publish 自体の失敗（キャンセルを含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Resolution,
    Delivery,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("expects topic as first argument")]
    MissingTopic,

    #[error("expects data as second argument")]
    MissingData,

    #[error("invalid format: expects projects/PROJECT_ID/topics/NAME, got {0:?}")]
    InvalidTopicPath(String),

    #[error("read stdin: {0}")]
    Stdin(#[from] std::io::Error),

    #[error("decode line {line}: {source}")]
    DecodeLine {
        line: usize,
        #[source]
        source: base64::DecodeError,
    },

    #[error("no data to publish")]
    EmptyBatch,

    /// Duplicated payloads, base64-encoded, in order of first appearance.
    #[error("duplicates found: [{}]", .0.join(" "))]
    Duplicates(Vec<String>),

    #[error("resolve project: {0}")]
    Project(String),

    #[error("topic not found: {0}")]
    TopicNotFound(String),

    #[error("publish msg {index}: {source}")]
    Message {
        index: usize,
        #[source]
        source: Box<PublishError>,
    },

    #[error("cancelled")]
    Cancelled,

    #[error("publish task failed: {0}")]
    Task(String),

    #[error("{0}")]
    Backend(String),
}

impl PublishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingTopic
            | Self::MissingData
            | Self::InvalidTopicPath(_)
            | Self::Stdin(_)
            | Self::DecodeLine { .. }
            | Self::EmptyBatch
            | Self::Duplicates(_) => ErrorKind::Input,
            Self::Project(_) | Self::TopicNotFound(_) => ErrorKind::Resolution,
            Self::Message { .. } | Self::Cancelled | Self::Task(_) | Self::Backend(_) => {
                ErrorKind::Delivery
            }
        }
    }

    /// Index of the message whose publish failed, if any.
    pub fn message_index(&self) -> Option<usize> {
        match self {
            Self::Message { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub(crate) fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_error_carries_index_and_cause() {
        let err = PublishError::Message {
            index: 3,
            source: Box::new(PublishError::Backend("deadline exceeded".into())),
        };
        assert_eq!(err.to_string(), "publish msg 3: deadline exceeded");
        assert_eq!(err.message_index(), Some(3));
        assert_eq!(err.kind(), ErrorKind::Delivery);
    }

    #[test]
    fn duplicates_are_listed() {
        let err = PublishError::Duplicates(vec!["aGVsbG8=".into(), "d29ybGQ=".into()]);
        assert_eq!(err.to_string(), "duplicates found: [aGVsbG8= d29ybGQ=]");
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn topic_not_found_is_a_resolution_error() {
        let err = PublishError::TopicNotFound("projects/p/topics/t".into());
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert_eq!(err.message_index(), None);
    }
}
