//! Priority frontier for crawl tasks
//!
//! This module handles:
//! - Admission control (depth bound, duplicate detection, closed queue)
//! - Priority ordering of queued tasks, ties broken by insertion order
//! - The Running → Draining → Idle queue lifecycle

use crate::config::CrawlerConfig;
use crate::crawler::task::CrawlTask;
use crate::state::{QueueState, VisitedSet};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A task waiting in the frontier
#[derive(Debug)]
struct QueuedTask {
    task: CrawlTask,

    /// Insertion sequence number
    seq: u64,
}

// Higher priority values pop first from the max-heap; among equal priorities
// the earlier insertion pops first
impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        self.task
            .priority
            .cmp(&other.task.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for QueuedTask {}

/// Outcome of offering a task to the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Task entered the frontier
    Queued,

    /// Canonical URL was already admitted earlier in this crawl
    Duplicate,

    /// Task depth exceeds the configured maximum
    TooDeep,

    /// Queue is draining or idle and takes no new work
    Closed,
}

/// Scheduler owns the frontier and the queue lifecycle
///
/// It is plain data: the coordinator drives it from a single execution
/// context, so admission and dispatch never race.
#[derive(Debug)]
pub struct Scheduler {
    /// Frontier priority queue (higher priority values are started first)
    frontier: BinaryHeap<QueuedTask>,

    /// Next insertion sequence number
    next_seq: u64,

    /// Deepest admissible depth
    max_depth: u32,

    /// Queue lifecycle
    state: QueueState,
}

impl Scheduler {
    /// Creates an empty, running scheduler
    pub fn new(config: &CrawlerConfig) -> Self {
        Self {
            frontier: BinaryHeap::new(),
            next_seq: 0,
            max_depth: config.max_depth,
            state: QueueState::Running,
        }
    }

    /// Offers a task for admission
    ///
    /// Checks run in order: queue closed, depth bound, visited set. Only a
    /// task that passes all three is recorded in `visited`, so a task
    /// rejected for depth does not block the same URL reached by a shorter
    /// path later.
    ///
    /// # Arguments
    ///
    /// * `task` - The task to admit
    /// * `visited` - The crawl's visited set
    pub fn admit(&mut self, task: CrawlTask, visited: &mut VisitedSet) -> Admission {
        if !self.state.accepts_tasks() {
            tracing::trace!("Queue {} - rejecting {}", self.state, task.url);
            return Admission::Closed;
        }

        if task.depth > self.max_depth {
            tracing::trace!(
                "Depth {} exceeds max {} - rejecting {}",
                task.depth,
                self.max_depth,
                task.url
            );
            return Admission::TooDeep;
        }

        if !visited.try_visit(task.url.as_str()) {
            tracing::trace!("Already admitted: {}", task.url);
            return Admission::Duplicate;
        }

        tracing::debug!(
            "Queued {} (depth {}, priority {})",
            task.url,
            task.depth,
            task.priority
        );

        let seq = self.next_seq;
        self.next_seq += 1;
        self.frontier.push(QueuedTask { task, seq });

        Admission::Queued
    }

    /// Pops the highest-priority task, if the queue is running
    pub fn next_task(&mut self) -> Option<CrawlTask> {
        if !self.state.accepts_tasks() {
            return None;
        }
        self.frontier.pop().map(|queued| queued.task)
    }

    /// Stops admissions and discards every queued task
    ///
    /// # Returns
    ///
    /// The number of tasks discarded
    pub fn drain(&mut self) -> usize {
        self.transition(QueueState::Draining);
        let discarded = self.frontier.len();
        self.frontier.clear();
        discarded
    }

    /// Marks the queue idle; called once nothing is queued or running
    pub fn finish(&mut self) {
        self.frontier.clear();
        self.transition(QueueState::Idle);
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    /// Returns the number of tasks in the frontier
    pub fn len(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    fn transition(&mut self, next: QueueState) {
        if self.state == next {
            return;
        }
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal queue transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!("Queue {} -> {}", self.state, next);
        self.state = next;
    }
}
