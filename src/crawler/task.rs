use crate::crawler::priority::Rule;
use url::Url;

/// One unit of crawl work
///
/// Built when the seed is submitted or when a finished page yields a link,
/// image, PDF or frame reference. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Absolute URL to process
    pub url: Url,

    /// Recursion depth from the seed (the seed is 0)
    pub depth: u32,

    /// Scheduling priority; higher values start sooner
    pub priority: i32,
}

impl CrawlTask {
    pub fn new(url: Url, depth: u32, priority: i32) -> Self {
        Self {
            url,
            depth,
            priority,
        }
    }

    /// The initial task of a crawl
    pub fn seed(url: Url) -> Self {
        Self::new(url, 0, Rule::Seed.weight())
    }

    /// A follow-up task one level below `self`
    pub fn child(&self, url: Url, priority: i32) -> Self {
        Self::new(url, self.depth + 1, priority)
    }
}
