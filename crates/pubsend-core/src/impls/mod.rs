//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **GcpTopicClient**: google-cloud-pubsub を使う本番用クライアント
//! - **InMemoryTopicClient**: テスト・開発用（ネットワーク不要）
//! - **GcloudProject / FixedProject**: project ID の解決

pub mod gcp;
pub mod inmem_topics;
pub mod project;

pub use self::gcp::GcpTopicClient;
pub use self::inmem_topics::InMemoryTopicClient;
pub use self::project::{FixedProject, GcloudProject};
