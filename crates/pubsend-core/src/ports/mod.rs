//! Ports - 抽象化レイヤー
//!
//! 外部システム（Pub/Sub, gcloud）へのインターフェース。
//! driver はこれらの trait だけに依存し、SDK の型は `impls` に閉じ込める。

pub mod project;
pub mod topic_client;

pub use self::project::ProjectResolver;
pub use self::topic_client::{MessagePublisher, TopicClient};
