//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the TextCache trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CachedText, StorageResult, TextCache};
use crate::ScoutError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-backed website text cache
pub struct SqliteTextCache {
    conn: Connection,
}

impl SqliteTextCache {
    /// Opens (or creates) the cache database at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteTextCache)` - Successfully opened/created database
    /// * `Err(ScoutError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, ScoutError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, ScoutError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl TextCache for SqliteTextCache {
    fn get(&self, url: &str) -> StorageResult<Option<CachedText>> {
        let entry = self
            .conn
            .query_row(
                "SELECT url, text, stored_at FROM website_text WHERE url = ?1",
                params![url],
                |row| {
                    Ok(CachedText {
                        url: row.get(0)?,
                        text: row.get(1)?,
                        stored_at: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(entry)
    }

    fn put(&mut self, url: &str, text: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO website_text (url, text, stored_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(url) DO UPDATE SET text = excluded.text, stored_at = excluded.stored_at",
            params![url, text, now],
        )?;
        Ok(())
    }

    fn delete(&mut self, url: &str) -> StorageResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM website_text WHERE url = ?1", params![url])?;
        Ok(removed > 0)
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM website_text", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
