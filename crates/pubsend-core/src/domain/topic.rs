//! TopicPath - topic の参照
//!
//! # 形式
//! - 短い名前: `orders` → 現在の project 内の topic
//! - 完全修飾: `projects/<project>/topics/<name>` → 任意の project の topic

use serde::{Serialize, Serializer};
use std::fmt;

use super::errors::PublishError;

/// Fully-resolved topic reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicPath {
    project: String,
    name: String,
}

impl TopicPath {
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
        }
    }

    /// Resolve a topic argument against the active project.
    ///
    /// Anything containing `/` is treated as a fully-qualified path and must
    /// have exactly four segments; otherwise the argument is a short name.
    pub fn resolve(raw: &str, default_project: &str) -> Result<Self, PublishError> {
        if raw.contains('/') {
            tracing::debug!(topic = raw, "assuming topic is full path");
            return raw.parse();
        }
        if raw.is_empty() {
            return Err(PublishError::MissingTopic);
        }
        Ok(Self::new(default_project, raw))
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::str::FromStr for TopicPath {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            ["projects", project, "topics", name] if !project.is_empty() && !name.is_empty() => {
                Ok(Self::new(*project, *name))
            }
            _ => Err(PublishError::InvalidTopicPath(s.to_string())),
        }
    }
}

impl fmt::Display for TopicPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projects/{}/topics/{}", self.project, self.name)
    }
}

impl Serialize for TopicPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
