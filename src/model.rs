//! Core data model.
//!
//! A work item is a piece of text handed to exactly one worker. Each worker
//! has a stable id and files exactly one completion report when it runs out
//! of work.

use serde::Serialize;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Work Item
// ---------------------------------------------------------------------------

/// An opaque text message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem(String);

impl WorkItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The `n`th message of a run, counting from 1.
    pub fn numbered(n: usize) -> Self {
        Self(format!("work message #{n}"))
    }
}

impl std::fmt::Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Worker identity and lifecycle
// ---------------------------------------------------------------------------

/// Newtype for worker IDs. Sequential from 1 within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WorkerId(pub usize);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Lifecycle state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Receiving and processing items.
    Running,
    /// Work channel observed closed; building the completion report.
    Draining,
    /// Report sent. Terminal.
    Finished,
}

impl WorkerState {
    /// Can transition from self to `to`?
    pub fn can_transition_to(self, to: WorkerState) -> bool {
        use WorkerState::*;
        matches!((self, to), (Running, Draining) | (Draining, Finished))
    }

    pub fn is_terminal(self) -> bool {
        self == WorkerState::Finished
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkerState::Running => "running",
            WorkerState::Draining => "draining",
            WorkerState::Finished => "finished",
        }
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Summary a worker sends exactly once, after the work channel closes.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionReport {
    pub worker: WorkerId,
    /// Number of items this worker consumed.
    pub processed: usize,
    /// Wall-clock time from worker start to report.
    pub elapsed: Duration,
    pub message: String,
}

impl CompletionReport {
    pub fn new(worker: WorkerId, processed: usize, elapsed: Duration) -> Self {
        Self {
            worker,
            processed,
            elapsed,
            message: format!("worker {} finished in {elapsed:?}", worker.0),
        }
    }
}

/// Outcome of one manager run. Reports are kept in arrival order.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub workers: usize,
    pub messages: usize,
    pub elapsed: Duration,
    pub reports: Vec<CompletionReport>,
}

impl RunSummary {
    /// Items consumed across the whole pool.
    pub fn total_processed(&self) -> usize {
        self.reports.iter().map(|r| r.processed).sum()
    }
}
