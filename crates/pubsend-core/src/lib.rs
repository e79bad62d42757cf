//! pubsend-core
//!
//! Building blocks for publishing messages to a Pub/Sub topic.
//!
//! # モジュール構成
//! - **domain**: 値オブジェクト（TopicPath, MessageBatch, ServerId, PublishReport, errors）
//! - **ports**: 外部システムへの抽象化（TopicClient, MessagePublisher, ProjectResolver）
//! - **impls**: ports の実装（GCP Pub/Sub, InMemory, gcloud）
//! - **app**: Publish Driver（decode → validate → resolve → dispatch → report）

pub mod domain;
pub mod ports;
pub mod impls;
pub mod app;

pub use app::{DispatchOptions, PublishDriver, PublishRequest};
pub use domain::{ErrorKind, PublishError, PublishReport};
