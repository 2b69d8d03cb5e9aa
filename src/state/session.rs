use crate::config::CrawlerConfig;
use crate::output::{CrawlStats, ResultBuckets};
use crate::state::{VisitedSet, WorkBudget};
use url::Url;

/// All mutable state of a single `crawl()` invocation
///
/// Created when a crawl starts and dropped when it returns, so nothing leaks
/// from one crawl into the next. Only the coordinator's own execution context
/// mutates it; tasks in flight never hold a reference to it.
#[derive(Debug)]
pub struct CrawlSession {
    /// The URL the crawl started from
    pub seed: Url,

    /// Canonical URLs already admitted
    pub visited: VisitedSet,

    /// Heavy-task counter
    pub budget: WorkBudget,

    /// Text collected so far
    pub buckets: ResultBuckets,

    /// Counters reported at the end of the crawl
    pub stats: CrawlStats,
}

impl CrawlSession {
    pub fn new(seed: Url, config: &CrawlerConfig) -> Self {
        Self {
            seed,
            visited: VisitedSet::new(),
            budget: WorkBudget::new(config.work_budget),
            buckets: ResultBuckets::new(),
            stats: CrawlStats::default(),
        }
    }
}
