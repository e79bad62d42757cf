//! App - Publish Driver
//!
//! ports を組み合わせて publish のパイプラインを実装します。
//!
//! `Parse → Validate → ResolveTopic → CheckExists → Dispatch → Aggregate → Report`
//!
//! # 主要コンポーネント
//! - **input**: 引数 / stdin から payload を取り出す
//! - **dispatch**: メッセージごとに task を立てて並行 publish
//! - **driver**: パイプライン全体

pub mod dispatch;
pub mod driver;
pub mod input;

pub use self::dispatch::{DispatchOptions, publish_all};
pub use self::driver::{PublishDriver, PublishRequest, or_cancelled};
