//! ProjectResolver port - 現在の project ID を決定する

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::PublishError;

#[async_trait]
pub trait ProjectResolver: Send + Sync {
    async fn resolve(&self, cancel: &CancellationToken) -> Result<String, PublishError>;
}
