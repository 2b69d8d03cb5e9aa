//! Database schema definitions
//!
//! This module contains the SQL schema for the website text cache.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Aggregated crawl output per seed URL
CREATE TABLE IF NOT EXISTS website_text (
    url TEXT PRIMARY KEY,
    text TEXT NOT NULL,
    stored_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
