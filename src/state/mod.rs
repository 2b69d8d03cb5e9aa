//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlSession`: everything one crawl mutates, scoped to that crawl
//! - `VisitedSet`: canonical URLs already admitted
//! - `WorkBudget`: heavy-task start counter
//! - `QueueState`: Running / Draining / Idle lifecycle of the task queue

mod budget;
mod queue_state;
mod session;
mod visited;

// Re-export main types
pub use budget::WorkBudget;
pub use queue_state::QueueState;
pub use session::CrawlSession;
pub use visited::VisitedSet;
