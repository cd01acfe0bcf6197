use crate::dlog;
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::Path;

/// Key under which the workout list is persisted.
pub const WORKOUTS_KEY: &str = "workouts";

/// String key-value persistence backend.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Key-value table in a SQLite file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let shown = path.display();
        let conn =
            Connection::open(path).with_context(|| format!("Opening SQLite DB: {shown}"))?;
        tracing::info!(path = %shown, "opened workout database");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Opening in-memory SQLite DB")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS kv (
              key    TEXT PRIMARY KEY,
              value  TEXT NOT NULL
            );
            ",
        )
        .context("Ensuring SQLite schema")?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Reading key {key:?}"))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                r"
                INSERT INTO kv (key, value) VALUES (?1, ?2)
                ON CONFLICT (key) DO UPDATE SET value = excluded.value
                ",
                params![key, value],
            )
            .with_context(|| format!("Writing key {key:?}"))?;
        dlog!("kv_set key={key} bytes={}", value.len());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", [key])
            .with_context(|| format!("Removing key {key:?}"))?;
        dlog!("kv_remove key={key} removed={n}");
        Ok(())
    }
}

/// Process-local backend; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
