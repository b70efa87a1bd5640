//! External collaborator contracts
//!
//! The orchestrator's tools talk to a semantic document store, a relational
//! timetable engine and a clock. Each is a trait so tests can swap in mock
//! implementations; the production types live in the submodules.

mod chroma;
mod timetable;

pub use chroma::{ChromaStore, MistralEmbeddings};
pub use timetable::SqliteTimetable;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExternalError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider error ({status}): {message}")]
    Provider { status: u16, message: String },
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
}

pub type ExternalResult<T> = Result<T, ExternalError>;

/// A retrieved document with its source metadata
#[derive(Debug, Clone)]
pub struct Document {
    pub content: String,
    pub metadata: serde_json::Value,
}

/// Semantic document store
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return the `k` documents closest to the query, best first.
    async fn similarity_search(&self, query: &str, k: usize) -> ExternalResult<Vec<Document>>;
}

/// Relational engine holding the showtime timetable
#[async_trait]
pub trait SqlEngine: Send + Sync {
    /// SQL dialect identifier, interpolated into the generation prompt
    fn dialect(&self) -> &str;

    /// Schema description for the generation prompt
    async fn table_info(&self) -> ExternalResult<String>;

    /// Execute a query and render the result rows as text
    async fn execute(&self, query: &str) -> ExternalResult<String>;
}

/// Source of the current date and time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
