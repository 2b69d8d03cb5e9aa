//! Per-crawl counters

use std::fmt;

/// Counters collected while a crawl runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Tasks that passed admission
    pub admitted: u64,

    /// Tasks rejected because their canonical URL was already admitted
    pub duplicates: u64,

    /// Tasks rejected for exceeding the depth bound
    pub too_deep: u64,

    /// Tasks offered after the queue stopped accepting work
    pub rejected_while_draining: u64,

    /// Heavy tasks started (counted against the work budget)
    pub started: u64,

    /// Tasks dropped at dispatch as non-textual assets
    pub skipped_non_textual: u64,

    /// Heavy tasks that ended in a soft failure
    pub failed: u64,

    /// Queued tasks thrown away when the queue began draining
    pub discarded_on_drain: u64,

    /// Fragments appended to result buckets
    pub fragments: u64,
}

impl CrawlStats {
    /// Logs a one-line summary
    pub fn log_summary(&self, seed: &str) {
        tracing::info!("Crawl summary for {}: {}", seed, self);
    }
}

impl fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "admitted={} started={} failed={} skipped={} duplicates={} too_deep={} discarded={} rejected_draining={} fragments={}",
            self.admitted,
            self.started,
            self.failed,
            self.skipped_non_textual,
            self.duplicates,
            self.too_deep,
            self.discarded_on_drain,
            self.rejected_while_draining,
            self.fragments
        )
    }
}
