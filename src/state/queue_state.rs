/// Queue lifecycle state definitions
///
/// A crawl queue starts `Running`, may move to `Draining` once the work budget
/// is spent, and ends `Idle` when nothing is queued or running.
use std::fmt;

/// Represents the lifecycle state of the crawl queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueState {
    /// Tasks are admitted and started
    Running,

    /// Budget reached: queued tasks were discarded, admissions are refused,
    /// running tasks are allowed to finish
    Draining,

    /// Nothing queued and nothing running (terminal)
    Idle,
}

impl QueueState {
    /// Returns true if new tasks may still be admitted
    pub fn accepts_tasks(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// Running → Draining, Running → Idle and Draining → Idle are legal;
    /// staying put is always allowed. Nothing leaves `Idle`.
    pub fn can_transition_to(&self, next: QueueState) -> bool {
        match (self, next) {
            (a, b) if *a == b => true,
            (Self::Running, Self::Draining) => true,
            (Self::Running, Self::Idle) => true,
            (Self::Draining, Self::Idle) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for QueueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
