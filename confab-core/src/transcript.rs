//! Persisted chat and message records.

use serde::{Deserialize, Serialize};

/// A chat with a running token total. The counter only ever grows; every
/// finished completion adds its estimated token count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    #[serde(default)]
    pub total_tokens: usize,
}

impl Chat {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            total_tokens: 0,
        }
    }
}

/// A single message in a chat. While a completion streams, `content` is
/// overwritten in place with the snapshot so far.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub content: String,
}

impl Message {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}
