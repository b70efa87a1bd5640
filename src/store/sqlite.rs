//! SQLite-backed conversation store

use super::{ConversationStore, Message, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SQL schema for initialization
const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS threads (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    thread_id TEXT NOT NULL,
    sequence_id INTEGER NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,

    FOREIGN KEY (thread_id) REFERENCES threads(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_thread ON messages(thread_id, sequence_id);
";

/// Thread-safe store handle
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn load(&self, thread_id: &str) -> StoreResult<Vec<Message>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT content FROM messages WHERE thread_id = ?1 ORDER BY sequence_id ASC",
        )?;

        let rows = stmt.query_map(params![thread_id], |row| row.get::<_, String>(0))?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(serde_json::from_str(&row?)?);
        }
        Ok(messages)
    }

    async fn replace(&self, thread_id: &str, messages: &[Message]) -> StoreResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        // One transaction: the checkpoint swap is all-or-nothing.
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO threads (id, created_at, updated_at) VALUES (?1, ?2, ?2)
             ON CONFLICT(id) DO UPDATE SET updated_at = ?2",
            params![thread_id, now],
        )?;
        tx.execute(
            "DELETE FROM messages WHERE thread_id = ?1",
            params![thread_id],
        )?;
        for (sequence_id, message) in messages.iter().enumerate() {
            let id = uuid::Uuid::new_v4().to_string();
            let content = serde_json::to_string(message)?;
            tx.execute(
                "INSERT INTO messages (id, thread_id, sequence_id, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, thread_id, sequence_id as i64, content, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ToolCall;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_unknown_thread_is_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_then_load_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();

        let messages = vec![
            Message::human("hi"),
            Message::assistant_with_calls(
                "",
                vec![ToolCall::new(
                    "c1",
                    "retrieve_movie_info",
                    json!({"question": "hi"}),
                )],
            ),
            Message::tool("c1", "Source: tmdb\nContent: ..."),
            Message::assistant("here you go"),
        ];
        store.replace("thread-1", &messages).await.unwrap();

        let loaded = store.load("thread-1").await.unwrap();
        assert_eq!(loaded, messages);
    }

    #[tokio::test]
    async fn test_replace_is_wholesale() {
        let store = SqliteStore::open_in_memory().unwrap();

        let long: Vec<Message> = (0..12)
            .map(|i| Message::human(format!("message {i}")))
            .collect();
        store.replace("thread-1", &long).await.unwrap();

        // Condensation swaps the entire sequence for a two-message one.
        let condensed = vec![Message::assistant("summary"), Message::human("message 11")];
        store.replace("thread-1", &condensed).await.unwrap();

        let loaded = store.load("thread-1").await.unwrap();
        assert_eq!(loaded, condensed);
    }

    #[tokio::test]
    async fn test_threads_are_independent() {
        let store = SqliteStore::open_in_memory().unwrap();

        store
            .replace("alice", &[Message::human("from alice")])
            .await
            .unwrap();
        store
            .replace("bob", &[Message::human("from bob")])
            .await
            .unwrap();

        assert_eq!(store.load("alice").await.unwrap().len(), 1);
        assert_eq!(store.load("bob").await.unwrap()[0].text(), "from bob");
    }

    #[tokio::test]
    async fn test_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversations.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .replace("thread-1", &[Message::human("remember me")])
                .await
                .unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        let loaded = reopened.load("thread-1").await.unwrap();
        assert_eq!(loaded[0].text(), "remember me");
    }
}
