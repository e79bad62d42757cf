//! Server-assigned identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier returned by Pub/Sub once a message is durably received.
///
/// Opaque: never parsed, only logged and reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ServerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_id_serializes_as_plain_string() {
        let id = ServerId::new("1234567890");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1234567890\"");
        assert_eq!(id.to_string(), "1234567890");
    }
}
