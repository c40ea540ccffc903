//! UI-agnostic conversation types
//!
//! These are shared between the streaming client and whatever surface renders
//! the conversation, and don't depend on any specific UI framework.

use serde::{Deserialize, Serialize};

use crate::stream::StreamStats;

/// A chat message in the agent conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// The resolved result of one submitted query
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub query: String,
    pub response: String,
    pub history: Vec<ChatMessage>,
    #[serde(skip)]
    pub stats: StreamStats,
}

/// Incremental notification emitted for every `delta` event, before the call resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDelta {
    pub delta: String,
    pub role: ChatRole,
}

impl StreamDelta {
    pub fn assistant(delta: impl Into<String>) -> Self {
        Self {
            delta: delta.into(),
            role: ChatRole::Assistant,
        }
    }
}
