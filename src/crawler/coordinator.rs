//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Dispatching queued tasks to the page, image and PDF adapters
//! - Enforcing the concurrency limit and the work budget
//! - Bucketing extracted text by relevance
//! - Admitting follow-up links, images and frames
//!
//! All session state is touched only from the loop itself. Tasks in flight
//! borrow the adapters and hand their results back; they never see the
//! session, so no locking is needed.

use crate::config::CrawlerConfig;
use crate::crawler::classifier::{page_bucket, term_match, HAPPY_HOUR};
use crate::crawler::page::{PageContent, PageSource};
use crate::crawler::priority::{frame_substitute_priority, happy_hour_image_priority, link_priority};
use crate::crawler::scheduler::{Admission, Scheduler};
use crate::crawler::task::CrawlTask;
use crate::ocr::{ImageOcr, PdfOcr};
use crate::output::{aggregate, Bucket, CrawlStats, ResultBuckets};
use crate::state::{CrawlSession, QueueState};
use crate::url::{classify, same_host, ResourceKind};
use crate::ScoutError;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};
use url::Url;

/// Everything a finished crawl produced
#[derive(Debug)]
pub struct CrawlReport {
    pub seed: Url,
    pub buckets: ResultBuckets,
    pub stats: CrawlStats,
    /// Always `Idle` once `run` returns
    pub final_state: QueueState,
}

impl CrawlReport {
    /// The aggregated output text
    pub fn text(&self) -> String {
        aggregate(&self.buckets)
    }
}

/// What a heavy task hands back to the loop
enum TaskYield {
    Page(PageContent),
    Image(Option<String>),
    Pdf(Option<String>),
    Skipped,
}

struct Completed {
    task: CrawlTask,
    result: Result<TaskYield, ScoutError>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: CrawlerConfig,
    pages: Arc<dyn PageSource>,
    images: Arc<dyn ImageOcr>,
    pdfs: Arc<dyn PdfOcr>,
}

impl Coordinator {
    pub fn new(
        config: CrawlerConfig,
        pages: Arc<dyn PageSource>,
        images: Arc<dyn ImageOcr>,
        pdfs: Arc<dyn PdfOcr>,
    ) -> Self {
        Self {
            config,
            pages,
            images,
            pdfs,
        }
    }

    /// Crawls from `seed` until the queue goes idle
    ///
    /// Task failures are logged and counted, never returned: a site that
    /// fails entirely produces a report with empty buckets.
    ///
    /// # Loop
    ///
    /// 1. Fill free slots from the frontier, highest priority first
    ///    - non-textual assets are dropped without spending budget
    ///    - a heavy task that cannot get budget starts the drain
    /// 2. Wait for any running task to finish and absorb its result
    /// 3. If the budget is spent, drain the frontier
    /// 4. Stop once nothing is running and nothing can start
    pub async fn run(&self, seed: Url) -> CrawlReport {
        info!("Starting crawl of {}", seed);

        let mut session = CrawlSession::new(seed.clone(), &self.config);
        let mut scheduler = Scheduler::new(&self.config);
        let slots = self.config.concurrency();
        let mut in_flight: FuturesUnordered<BoxFuture<'_, Completed>> = FuturesUnordered::new();

        offer(&mut scheduler, &mut session, CrawlTask::seed(seed));

        loop {
            while in_flight.len() < slots {
                let Some(task) = scheduler.next_task() else {
                    break;
                };

                let kind = classify(&task.url);
                if !kind.is_heavy() {
                    trace!("Skipping non-textual asset {}", task.url);
                    session.stats.skipped_non_textual += 1;
                    continue;
                }

                if !session.budget.try_start() {
                    session.stats.discarded_on_drain += 1;
                    begin_drain(&mut scheduler, &mut session);
                    break;
                }

                session.stats.started += 1;
                debug!(
                    "Starting {} task {} (depth {}, priority {}, {}/{} budget)",
                    kind.as_str(),
                    task.url,
                    task.depth,
                    task.priority,
                    session.budget.started(),
                    session.budget.ceiling()
                );
                in_flight.push(self.execute(task, kind));
            }

            let Some(completed) = in_flight.next().await else {
                break;
            };

            self.absorb(completed, &mut scheduler, &mut session);

            if session.budget.is_exhausted() && scheduler.state() == QueueState::Running {
                begin_drain(&mut scheduler, &mut session);
            }
        }

        scheduler.finish();
        session.stats.log_summary(session.seed.as_str());

        CrawlReport {
            seed: session.seed,
            buckets: session.buckets,
            stats: session.stats,
            final_state: scheduler.state(),
        }
    }

    fn execute(&self, task: CrawlTask, kind: ResourceKind) -> BoxFuture<'_, Completed> {
        async move {
            let result = match kind {
                ResourceKind::Page => self.pages.extract(&task.url).await.map(TaskYield::Page),
                ResourceKind::Image => self.images.ocr_image(&task.url).await.map(TaskYield::Image),
                ResourceKind::Pdf => self.pdfs.ocr_pdf(&task.url).await.map(TaskYield::Pdf),
                ResourceKind::NonTextualSkip => Ok(TaskYield::Skipped),
            };
            Completed { task, result }
        }
        .boxed()
    }

    fn absorb(&self, completed: Completed, scheduler: &mut Scheduler, session: &mut CrawlSession) {
        let Completed { task, result } = completed;

        match result {
            Ok(TaskYield::Page(content)) => absorb_page(&task, content, scheduler, session),
            Ok(TaskYield::Image(text)) => record_ocr(&task, Bucket::HappyHourLinkImages, text, session),
            Ok(TaskYield::Pdf(text)) => record_ocr(&task, Bucket::HappyHourPdf, text, session),
            Ok(TaskYield::Skipped) => {}
            Err(e) => {
                session.stats.failed += 1;
                if task.depth == 0 {
                    error!("Seed {} failed: {}", task.url, e);
                } else {
                    warn!("Failed to process {}: {}", task.url, e);
                }
            }
        }
    }
}

fn offer(scheduler: &mut Scheduler, session: &mut CrawlSession, task: CrawlTask) {
    match scheduler.admit(task, &mut session.visited) {
        Admission::Queued => session.stats.admitted += 1,
        Admission::Duplicate => session.stats.duplicates += 1,
        Admission::TooDeep => session.stats.too_deep += 1,
        Admission::Closed => session.stats.rejected_while_draining += 1,
    }
}

fn begin_drain(scheduler: &mut Scheduler, session: &mut CrawlSession) {
    let discarded = scheduler.drain();
    session.stats.discarded_on_drain += discarded as u64;
    info!(
        "Work budget of {} reached; discarded {} queued task(s)",
        session.budget.ceiling(),
        discarded
    );
}

/// Keeps OCR text only when it mentions happy hour
fn record_ocr(task: &CrawlTask, bucket: Bucket, text: Option<String>, session: &mut CrawlSession) {
    match text {
        Some(text) if term_match(&text, HAPPY_HOUR) => {
            debug!("{} yielded happy hour text", task.url);
            session.buckets.push(bucket, task.url.as_str(), text);
            session.stats.fragments += 1;
        }
        _ => trace!("No happy hour text in {}", task.url),
    }
}

fn absorb_page(task: &CrawlTask, content: PageContent, scheduler: &mut Scheduler, session: &mut CrawlSession) {
    let PageContent {
        text,
        links,
        images,
        frames,
    } = content;
    let seed = session.seed.clone();

    // Framesets and iframe wrappers render no text of their own
    if text.trim().is_empty() {
        if let Some(frame) = frames.into_iter().next() {
            debug!("{} has no text; following frame {}", task.url, frame);
            offer(scheduler, session, task.child(frame, frame_substitute_priority()));
        }
    }

    let url_mentions_happy_hour = term_match(task.url.as_str(), HAPPY_HOUR);

    if let Some(bucket) = page_bucket(&task.url, &text) {
        debug!("{} -> {}", task.url, bucket);
        session.buckets.push(bucket, task.url.as_str(), text);
        session.stats.fragments += 1;
    }

    if url_mentions_happy_hour {
        for image in images.into_iter().filter(|i| classify(i) == ResourceKind::Image) {
            offer(scheduler, session, task.child(image, happy_hour_image_priority()));
        }
    }

    for link in links.into_iter().filter(|l| same_host(l, &seed)) {
        let priority = link_priority(&link, &seed);
        offer(scheduler, session, task.child(link, priority));
    }
}
