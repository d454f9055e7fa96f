//! SQLite-based durable storage.
//!
//! Provides persistent storage for:
//! - The key-value store backing the quiet-time gate and session snapshot
//! - A history of applied pet actions, with aggregate statistics

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::{data_dir, StateStore};
use crate::error::StoreError;
use crate::pet::ActionKind;

/// One applied action, as persisted to the history table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub id: i64,
    pub kind: String,
    pub at: DateTime<Utc>,
}

/// Aggregate action statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_actions: u64,
    pub today_actions: u64,
    pub feeds: u64,
    pub grooms: u64,
    pub plays: u64,
    pub cuddles: u64,
}

/// SQLite database for pet state and action history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/petling/petling.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?
            .join("petling.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and ephemeral embedders).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS actions (
                id    INTEGER PRIMARY KEY AUTOINCREMENT,
                kind  TEXT NOT NULL,
                at    TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_actions_at ON actions(at);
            CREATE INDEX IF NOT EXISTS idx_actions_kind ON actions(kind);",
        )?;
        Ok(())
    }

    /// Record an applied action to the history table.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_action(&self, kind: ActionKind, at: DateTime<Utc>) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO actions (kind, at) VALUES (?1, ?2)",
            params![kind.as_str(), at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent actions, newest first.
    pub fn recent_actions(&self, limit: usize) -> Result<Vec<ActionRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, kind, at FROM actions ORDER BY id DESC LIMIT ?1")?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, kind, at) = row?;
            let at = DateTime::parse_from_rfc3339(&at)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
            records.push(ActionRecord { id, kind, at });
        }
        Ok(records)
    }

    /// Aggregate statistics across the whole action history.
    pub fn stats(&self) -> Result<Stats, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, COUNT(*) FROM actions GROUP BY kind")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;

        let mut stats = Stats::default();
        for row in rows {
            let (kind, count) = row?;
            stats.total_actions += count;
            match kind.as_str() {
                "feed" => stats.feeds = count,
                "groom" => stats.grooms = count,
                "play" => stats.plays = count,
                "cuddle" => stats.cuddles = count,
                _ => {}
            }
        }

        let today = Utc::now().format("%Y-%m-%d").to_string();
        stats.today_actions = self.conn.query_row(
            "SELECT COUNT(*) FROM actions WHERE at >= ?1",
            params![format!("{today}T00:00:00+00:00")],
            |row| row.get::<_, u64>(0),
        )?;

        Ok(stats)
    }
}

impl StateStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}
