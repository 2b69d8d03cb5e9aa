//! Crawler module for page extraction and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - Page sources (headless browser, plain HTTP)
//! - HTML parsing and reference extraction
//! - Keyword classification and the priority policy
//! - Task scheduling under depth, concurrency and budget limits
//! - Overall crawl coordination

mod browser;
mod classifier;
mod coordinator;
mod fetcher;
mod page;
mod parser;
mod priority;
mod scheduler;
mod task;

pub use browser::WebDriverPages;
pub use classifier::{page_bucket, term_match, HAPPY_HOUR, MENU, SPECIAL};
pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{build_http_client, HttpPages};
pub use page::{PageContent, PageSource};
pub use parser::{parse_page, resolve_all, resolve_link};
pub use priority::{frame_substitute_priority, happy_hour_image_priority, link_priority, Rule};
pub use scheduler::{Admission, Scheduler};
pub use task::CrawlTask;

use crate::config::{BrowserBackend, Config};
use crate::ocr::OcrServices;
use crate::ScoutError;
use std::sync::Arc;
use url::Url;

/// Starts the configured page source
///
/// # Returns
///
/// * `Ok(Arc<dyn PageSource>)` - Ready to extract pages
/// * `Err(ScoutError)` - The browser could not be started
pub async fn build_page_source(config: &Config) -> Result<Arc<dyn PageSource>, ScoutError> {
    let timeout = config.crawler.navigation_timeout();

    match config.browser.backend {
        BrowserBackend::Webdriver => {
            let pages = WebDriverPages::launch(&config.browser, config.crawler.concurrency(), timeout).await?;
            Ok(Arc::new(pages))
        }
        BrowserBackend::Http => Ok(Arc::new(HttpPages::from_config(&config.browser, timeout)?)),
    }
}

/// Crawls a site and returns the full report
///
/// Only setup failures are returned as errors: building the OCR clients or
/// starting the browser. The page source is closed once the crawl ends; a
/// failure to close is logged and does not replace the crawl result.
pub async fn crawl_with_report(config: &Config, seed: Url) -> Result<CrawlReport, ScoutError> {
    let ocr = OcrServices::from_config(&config.ocr, &config.browser)?;
    let pages = build_page_source(config).await?;

    let coordinator = Coordinator::new(config.crawler.clone(), pages.clone(), ocr.images, ocr.pdfs);
    let report = coordinator.run(seed).await;

    if let Err(e) = pages.close().await {
        tracing::error!("Failed to close page source: {}", e);
    }

    Ok(report)
}

/// Runs a complete crawl operation
///
/// This is the main entry point. It will:
/// 1. Build the OCR clients and start the page source
/// 2. Crawl from `seed` within the configured depth, concurrency and budget
/// 3. Close the page source
/// 4. Aggregate the collected text
///
/// # Arguments
///
/// * `config` - The loaded configuration
/// * `seed` - The URL to start from
///
/// # Returns
///
/// * `Ok(String)` - Aggregated text; empty if nothing relevant was found
/// * `Err(ScoutError)` - Setup failed
pub async fn crawl(config: &Config, seed: Url) -> Result<String, ScoutError> {
    let report = crawl_with_report(config, seed).await?;
    Ok(report.text())
}
