//! ProjectResolver の実装
//!
//! - `FixedProject`: コマンドラインで指定された project
//! - `GcloudProject`: `gcloud config list` で現在の設定から取得

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::domain::PublishError;
use crate::ports::ProjectResolver;

pub struct FixedProject(String);

impl FixedProject {
    pub fn new(project: impl Into<String>) -> Self {
        Self(project.into())
    }
}

#[async_trait]
impl ProjectResolver for FixedProject {
    async fn resolve(&self, _cancel: &CancellationToken) -> Result<String, PublishError> {
        Ok(self.0.clone())
    }
}

/// Reads `core.project` from the active gcloud configuration.
pub struct GcloudProject {
    program: String,
}

impl GcloudProject {
    pub fn new() -> Self {
        Self::with_program("gcloud")
    }

    /// Use a different executable (tests, non-standard installs).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GcloudProject {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProjectResolver for GcloudProject {
    async fn resolve(&self, cancel: &CancellationToken) -> Result<String, PublishError> {
        let mut command = Command::new(&self.program);
        command
            .args(["config", "list", "--format", "value(core.project)"])
            .kill_on_drop(true);

        let output = tokio::select! {
            output = command.output() => output
                .map_err(|e| PublishError::Project(format!("run {}: {e}", self.program)))?,
            _ = cancel.cancelled() => return Err(PublishError::Cancelled),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PublishError::Project(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let project = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if project.is_empty() {
            return Err(PublishError::Project(
                "no project configured in gcloud; pass --project".into(),
            ));
        }
        Ok(project)
    }
}
