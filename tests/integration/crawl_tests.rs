//! Integration tests for the crawler
//!
//! These tests drive the full coordinator loop over in-memory page and OCR
//! sources, so the crawl cycle runs end-to-end without a browser or network.

use async_trait::async_trait;
use happyhour_scout::config::CrawlerConfig;
use happyhour_scout::crawler::{Coordinator, CrawlReport, PageContent, PageSource};
use happyhour_scout::ocr::{ImageOcr, PdfOcr};
use happyhour_scout::{Bucket, QueueState, ScoutError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Shared record of every adapter call, in start order
#[derive(Default)]
struct CallLog {
    calls: Mutex<Vec<String>>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl CallLog {
    fn enter(&self, kind: &str, url: &Url) {
        self.calls.lock().unwrap().push(format!("{} {}", kind, url));
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Serves canned pages; unknown URLs fail
struct MockPages {
    pages: HashMap<String, PageContent>,
    log: Arc<CallLog>,
    delay: Duration,
}

#[async_trait]
impl PageSource for MockPages {
    async fn extract(&self, url: &Url) -> Result<PageContent, ScoutError> {
        self.log.enter("page", url);
        tokio::time::sleep(self.delay).await;
        self.log.leave();

        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| ScoutError::ContentMismatch {
                url: url.to_string(),
                content_type: "application/octet-stream".to_string(),
            })
    }
}

/// Returns canned OCR text; unknown URLs fail
struct MockOcr {
    texts: HashMap<String, Option<String>>,
    log: Arc<CallLog>,
}

impl MockOcr {
    fn lookup(&self, kind: &str, url: &Url) -> Result<Option<String>, ScoutError> {
        self.log.enter(kind, url);
        self.log.leave();
        self.texts
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| ScoutError::Ocr(format!("no text for {}", url)))
    }
}

#[async_trait]
impl ImageOcr for MockOcr {
    async fn ocr_image(&self, url: &Url) -> Result<Option<String>, ScoutError> {
        self.lookup("image", url)
    }
}

#[async_trait]
impl PdfOcr for MockOcr {
    async fn ocr_pdf(&self, url: &Url) -> Result<Option<String>, ScoutError> {
        self.lookup("pdf", url)
    }
}

/// Builder for a mock site
#[derive(Default)]
struct Site {
    pages: HashMap<String, PageContent>,
    ocr: HashMap<String, Option<String>>,
    delay: Duration,
}

impl Site {
    fn page(mut self, url: &str, text: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            PageContent {
                text: text.to_string(),
                links: urls(links),
                ..Default::default()
            },
        );
        self
    }

    fn content(mut self, url: &str, content: PageContent) -> Self {
        self.pages.insert(url.to_string(), content);
        self
    }

    fn ocr(mut self, url: &str, text: Option<&str>) -> Self {
        self.ocr.insert(url.to_string(), text.map(str::to_string));
        self
    }

    fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn crawl(self, seed: &str, config: CrawlerConfig) -> (CrawlReport, Arc<CallLog>) {
        let log = Arc::new(CallLog::default());
        let pages = Arc::new(MockPages {
            pages: self.pages,
            log: log.clone(),
            delay: self.delay,
        });
        let ocr = Arc::new(MockOcr {
            texts: self.ocr,
            log: log.clone(),
        });

        let coordinator = Coordinator::new(config, pages, ocr.clone(), ocr);
        let report = coordinator.run(Url::parse(seed).unwrap()).await;
        (report, log)
    }
}

fn urls(list: &[&str]) -> Vec<Url> {
    list.iter().map(|u| Url::parse(u).unwrap()).collect()
}

fn config(max_depth: u32, max_concurrent_tasks: u32, work_budget: u32) -> CrawlerConfig {
    CrawlerConfig {
        max_depth,
        max_concurrent_tasks,
        work_budget,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_each_canonical_url_visited_once() {
    let (report, log) = Site::default()
        .page(
            "https://bar.com/",
            "welcome",
            &[
                "https://bar.com/menu",
                "https://bar.com/menu/",
                "http://bar.com/menu",
            ],
        )
        .page("https://bar.com/menu", "food", &["https://bar.com/", "https://bar.com/menu"])
        .crawl("https://bar.com/", config(3, 3, 25))
        .await;

    assert_eq!(
        log.calls(),
        vec!["page https://bar.com/", "page https://bar.com/menu"]
    );
    assert_eq!(report.stats.admitted, 2);
    assert_eq!(report.stats.duplicates, 4);
}

#[tokio::test]
async fn test_depth_bound() {
    let (report, log) = Site::default()
        .page("https://bar.com/", "home", &["https://bar.com/1"])
        .page("https://bar.com/1", "one", &["https://bar.com/2"])
        .page("https://bar.com/2", "two", &["https://bar.com/3"])
        .page("https://bar.com/3", "three", &[])
        .crawl("https://bar.com/", config(2, 3, 25))
        .await;

    assert_eq!(
        log.calls(),
        vec!["page https://bar.com/", "page https://bar.com/1", "page https://bar.com/2"]
    );
    assert_eq!(report.stats.too_deep, 1);
}

#[tokio::test]
async fn test_budget_bounds_heavy_starts() {
    let links: Vec<String> = (0..10).map(|i| format!("https://bar.com/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();

    let mut site = Site::default().page("https://bar.com/", "home", &link_refs);
    for link in &links {
        site = site.page(link, "nothing here", &[]);
    }

    let (report, log) = site.crawl("https://bar.com/", config(3, 2, 4)).await;

    assert_eq!(log.calls().len(), 4);
    assert_eq!(report.stats.started, 4);
    assert_eq!(report.stats.admitted, 11);
    assert_eq!(report.stats.discarded_on_drain, 7);
    assert_eq!(report.final_state, QueueState::Idle);
}

#[tokio::test]
async fn test_concurrency_limit() {
    let links: Vec<String> = (0..6).map(|i| format!("https://bar.com/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();

    let mut site = Site::default()
        .delay(Duration::from_millis(20))
        .page("https://bar.com/", "home", &link_refs);
    for link in &links {
        site = site.page(link, "nothing here", &[]);
    }

    let (report, log) = site.crawl("https://bar.com/", config(3, 2, 25)).await;

    assert_eq!(report.stats.started, 7);
    assert!(log.peak() <= 2, "peak concurrency was {}", log.peak());
}

#[tokio::test]
async fn test_happy_hour_page_images_start_first() {
    let seed = "https://bar.com/happy-hour";
    let (report, log) = Site::default()
        .content(
            seed,
            PageContent {
                text: "Join us".to_string(),
                links: urls(&[
                    "https://bar.com/menu",
                    "https://bar.com/menu.pdf",
                    "https://bar.com/specials",
                ]),
                images: urls(&[
                    "https://bar.com/hh.png",
                    "https://bar.com/logo.svg",
                    "https://bar.com/photo.jpg",
                ]),
                frames: vec![],
            },
        )
        .page("https://bar.com/menu", "", &[])
        .page("https://bar.com/specials", "", &[])
        .ocr("https://bar.com/hh.png", Some("HAPPY HOUR $5 wells"))
        .ocr("https://bar.com/photo.jpg", Some("a nice patio"))
        .ocr("https://bar.com/menu.pdf", None)
        .crawl(seed, config(3, 1, 25))
        .await;

    assert_eq!(
        log.calls(),
        vec![
            "page https://bar.com/happy-hour",
            "image https://bar.com/hh.png",
            "image https://bar.com/photo.jpg",
            "pdf https://bar.com/menu.pdf",
            "page https://bar.com/specials",
            "page https://bar.com/menu",
        ]
    );

    let images = report.buckets.get(Bucket::HappyHourLinkImages);
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].source, "https://bar.com/hh.png");
    assert_eq!(report.buckets.len(Bucket::HappyHourLinkText), 1);
    assert!(report.text().starts_with("FROM https://bar.com/hh.png:\nHAPPY HOUR $5 wells\n"));
}

#[tokio::test]
async fn test_empty_page_follows_first_frame() {
    let (report, log) = Site::default()
        .content(
            "https://bar.com/",
            PageContent {
                text: "  \n ".to_string(),
                frames: urls(&["https://menus.example.net/embed", "https://bar.com/nav"]),
                ..Default::default()
            },
        )
        .page("https://menus.example.net/embed", "Happy hour daily 3-6", &[])
        .crawl("https://bar.com/", config(3, 3, 25))
        .await;

    assert_eq!(
        log.calls(),
        vec!["page https://bar.com/", "page https://menus.example.net/embed"]
    );
    assert_eq!(
        report.text(),
        "FROM https://menus.example.net/embed:\nHappy hour daily 3-6\n"
    );
}

#[tokio::test]
async fn test_failed_seed_yields_empty_text() {
    let (report, _log) = Site::default()
        .crawl("https://bar.com/", config(3, 3, 25))
        .await;

    assert_eq!(report.text(), "");
    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.final_state, QueueState::Idle);
}

#[tokio::test]
async fn test_ocr_failures_do_not_stop_crawl() {
    let (report, log) = Site::default()
        .content(
            "https://bar.com/happy-hour",
            PageContent {
                text: "Happy hour menu below".to_string(),
                links: urls(&["https://bar.com/hh.pdf", "https://bar.com/about"]),
                images: urls(&["https://bar.com/hh.jpg"]),
                frames: vec![],
            },
        )
        .page("https://bar.com/about", "Daily specials", &[])
        .crawl("https://bar.com/happy-hour", config(3, 2, 25))
        .await;

    assert_eq!(log.calls().len(), 4);
    assert_eq!(report.stats.failed, 2);
    assert_eq!(
        report.text(),
        "FROM https://bar.com/happy-hour:\nHappy hour menu below\n"
    );
}

#[tokio::test]
async fn test_specials_only_when_nothing_better() {
    let (report, _log) = Site::default()
        .page("https://bar.com/", "welcome", &["https://bar.com/food"])
        .page("https://bar.com/food", "Daily special: tacos", &[])
        .crawl("https://bar.com/", config(3, 3, 25))
        .await;

    assert_eq!(report.text(), "FROM https://bar.com/food:\nDaily special: tacos\n");
}

#[tokio::test]
async fn test_offsite_links_are_not_followed() {
    let (_report, log) = Site::default()
        .page(
            "https://bar.com/",
            "welcome",
            &["https://instagram.com/happy-hour", "https://bar.com/about"],
        )
        .page("https://bar.com/about", "story", &[])
        .crawl("https://bar.com/", config(3, 3, 25))
        .await;

    assert_eq!(
        log.calls(),
        vec!["page https://bar.com/", "page https://bar.com/about"]
    );
}

#[tokio::test]
async fn test_runs_do_not_share_state() {
    let log = Arc::new(CallLog::default());
    let mut pages = HashMap::new();
    pages.insert(
        "https://bar.com/".to_string(),
        PageContent {
            text: "Happy Hour 4-6".to_string(),
            ..Default::default()
        },
    );
    let ocr = Arc::new(MockOcr {
        texts: HashMap::new(),
        log: log.clone(),
    });
    let coordinator = Coordinator::new(
        config(3, 3, 1),
        Arc::new(MockPages {
            pages,
            log: log.clone(),
            delay: Duration::ZERO,
        }),
        ocr.clone(),
        ocr,
    );

    let seed = Url::parse("https://bar.com/").unwrap();
    let first = coordinator.run(seed.clone()).await;
    let second = coordinator.run(seed).await;

    assert_eq!(first.text(), second.text());
    assert_eq!(first.stats, second.stats);
    assert_eq!(log.calls().len(), 2);
}
