//! Storage module for caching crawl output
//!
//! Crawl output is cached per seed URL so repeated lookups of the same site
//! do not re-crawl it. The cache is a plain put-or-get store; the crawler
//! itself never reads from it.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteTextCache;
pub use traits::{CachedText, StorageError, StorageResult, TextCache};

use crate::ScoutError;
use std::future::Future;
use std::path::Path;
use url::Url;

/// Opens or creates the website text cache
pub fn open_storage(path: &Path) -> Result<SqliteTextCache, ScoutError> {
    SqliteTextCache::new(path)
}

/// Returns cached text for `url`, crawling and storing it on a miss
///
/// With `refresh` set, any existing entry is dropped first so the site is
/// crawled again. A failed crawl stores nothing.
///
/// # Arguments
///
/// * `cache` - The cache to consult and fill
/// * `url` - The seed URL (also the cache key)
/// * `refresh` - Drop the cached entry before looking it up
/// * `scrape` - Produces the text on a cache miss
pub async fn cached_website_text<C, F, Fut>(
    cache: &mut C,
    url: &Url,
    refresh: bool,
    scrape: F,
) -> Result<String, ScoutError>
where
    C: TextCache + ?Sized,
    F: FnOnce(Url) -> Fut,
    Fut: Future<Output = Result<String, ScoutError>>,
{
    let key = url.as_str();

    if refresh && cache.delete(key)? {
        tracing::info!("Dropped cached text for {}", key);
    }

    if let Some(entry) = cache.get(key)? {
        tracing::info!("Using cached text for {} (stored {})", key, entry.stored_at);
        return Ok(entry.text);
    }

    let text = scrape(url.clone()).await?;
    cache.put(key, &text)?;
    tracing::debug!("Cached {} bytes of text for {}", text.len(), key);

    Ok(text)
}
