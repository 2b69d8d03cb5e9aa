//! Output module for crawl results
//!
//! This module handles:
//! - Accumulating extracted text into relevance buckets
//! - Aggregating the buckets into the crawl's output string
//! - Recording crawl statistics

mod buckets;
pub mod stats;

pub use buckets::{aggregate, has_meaningful_text, Bucket, Fragment, ResultBuckets};
pub use stats::CrawlStats;
