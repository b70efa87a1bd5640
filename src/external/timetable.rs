//! SQLite timetable engine
//!
//! The crawler ETL loads showtimes into a `timetable` table; this engine
//! exposes its schema for query generation and executes generated SQL.

use super::{ExternalResult, SqlEngine};
use async_trait::async_trait;
use rusqlite::Connection;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Timetable schema, mirroring the crawler's output columns
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS timetable (
    cinema TEXT,
    title TEXT,
    language TEXT,
    link TEXT,
    date DATE,
    time TIME
);
";

/// Thread-safe timetable handle
#[derive(Clone)]
pub struct SqliteTimetable {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTimetable {
    /// Open or create the timetable database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> ExternalResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory timetable (for testing)
    pub fn open_in_memory() -> ExternalResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> ExternalResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl SqlEngine for SqliteTimetable {
    fn dialect(&self) -> &str {
        "sqlite"
    }

    async fn table_info(&self) -> ExternalResult<String> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut info = String::new();
        for row in rows {
            if !info.is_empty() {
                info.push_str("\n\n");
            }
            info.push_str(&row?);
        }
        Ok(info)
    }

    async fn execute(&self, query: &str) -> ExternalResult<String> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(query)?;
        let column_count = stmt.column_count();

        let mut rows = stmt.query([])?;
        let mut rendered = String::new();
        while let Some(row) = rows.next()? {
            let mut fields = Vec::with_capacity(column_count);
            for i in 0..column_count {
                fields.push(render_value(row.get_ref(i)?));
            }
            writeln!(rendered, "{}", fields.join(" | ")).expect("write to String");
        }

        if rendered.is_empty() {
            Ok("no rows".to_string())
        } else {
            Ok(rendered.trim_end().to_string())
        }
    }
}

fn render_value(value: rusqlite::types::ValueRef<'_>) -> String {
    use rusqlite::types::ValueRef;
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(_) => "<blob>".to_string(),
    }
}
