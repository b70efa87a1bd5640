//! Conversation persistence
//!
//! Defines the message model shared by the whole crate and the
//! `ConversationStore` contract: an ordered message log per thread id with
//! atomic wholesale replacement of the checkpoint after each turn.

mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("corrupt message record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A tool invocation requested by the model. Only the model ever creates
/// these; the orchestrator pairs each one with exactly one tool message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// One entry in a conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    Human {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        call_id: String,
        content: String,
    },
}

impl Message {
    pub fn human(content: impl Into<String>) -> Self {
        Message::Human {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls: vec![],
        }
    }

    pub fn assistant_with_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Tool {
            call_id: call_id.into(),
            content: content.into(),
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Message::Human { .. })
    }

    /// Tool calls carried by this message (empty unless assistant-authored).
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    /// Free-text content of the message.
    pub fn text(&self) -> &str {
        match self {
            Message::Human { content }
            | Message::Assistant { content, .. }
            | Message::Tool { content, .. } => content,
        }
    }
}

/// Persistent ordered message log, one per thread id.
///
/// `replace` swaps the entire checkpoint in one shot: either the new
/// sequence is fully written or the previous one is left untouched.
/// Implementations must allow concurrent access to distinct thread ids;
/// turn-level serialization within one thread id is the orchestrator's job.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Load the message log for a thread. Unknown ids yield an empty log —
    /// a conversation exists once its first checkpoint is written.
    async fn load(&self, thread_id: &str) -> StoreResult<Vec<Message>>;

    /// Atomically replace the checkpoint for a thread.
    async fn replace(&self, thread_id: &str, messages: &[Message]) -> StoreResult<()>;
}
