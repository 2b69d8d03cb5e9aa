//! Storage traits and error types
//!
//! This module defines the key/value interface used to cache crawl output.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A cached crawl output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedText {
    /// Seed URL the text was crawled from
    pub url: String,

    /// Aggregated crawl output
    pub text: String,

    /// RFC 3339 timestamp of when the entry was written
    pub stored_at: String,
}

/// Put-or-get store for aggregated website text, keyed by seed URL
pub trait TextCache {
    /// Gets the cached entry for a URL
    fn get(&self, url: &str) -> StorageResult<Option<CachedText>>;

    /// Stores (or replaces) the text for a URL
    fn put(&mut self, url: &str, text: &str) -> StorageResult<()>;

    /// Removes the entry for a URL; returns true if one existed
    fn delete(&mut self, url: &str) -> StorageResult<bool>;

    /// Number of cached entries
    fn count(&self) -> StorageResult<u64>;
}
