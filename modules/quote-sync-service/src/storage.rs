//! SQLite-backed key-value storage for the quote sync service.
//!
//! A single table of key/value rows, each value an opaque string
//! (usually a JSON document).

use rusqlite::{Connection, OptionalExtension, Result as SqliteResult};
use std::sync::Mutex;

/// Key holding the versioned quote document.
pub const QUOTES_KEY: &str = "dqg.quotes";

/// Key holding the last category filter the user picked.
pub const SELECTED_CATEGORY_KEY: &str = "selectedCategory";

pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub fn open(path: &str) -> SqliteResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.create_tables()?;
        Ok(storage)
    }

    fn create_tables(&self) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> SqliteResult<Option<String>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT value FROM storage WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()
    }

    pub fn set(&self, key: &str, value: &str) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO storage (key, value, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let storage = Storage::open(":memory:").expect("open in-memory storage");
        assert_eq!(storage.get("missing").unwrap(), None);

        storage.set("k", "v1").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v1"));

        // Overwrite keeps a single row per key
        storage.set("k", "v2").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.db");
        let path = path.to_str().expect("utf-8 path");

        {
            let storage = Storage::open(path).expect("open storage");
            storage.set(QUOTES_KEY, "[]").unwrap();
        }

        let storage = Storage::open(path).expect("reopen storage");
        assert_eq!(storage.get(QUOTES_KEY).unwrap().as_deref(), Some("[]"));
    }
}
