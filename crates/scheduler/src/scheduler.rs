//! Scheduler trait and concurrency budget.

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::Job;

/// Error type for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors that can occur when submitting jobs.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The scheduler was shut down and accepts no more jobs
    #[error("Scheduler {0} is closed")]
    Closed(String),
}

/// Per-interpreter job queue.
///
/// `submit` only enqueues: it returns as soon as the job is accepted and
/// never waits for the job to run.
pub trait Scheduler: Send + Sync {
    /// Scheduler name.
    fn name(&self) -> &str;

    /// Enqueue a job.
    fn submit(&self, job: Arc<dyn Job>) -> Result<()>;

    /// Number of accepted jobs that have not started yet.
    fn queued(&self) -> usize;
}

/// Concurrency budget for a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    /// Max concurrent jobs
    pub max_concurrent: NonZeroUsize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_concurrent: NonZeroUsize::MIN,
        }
    }
}

impl Budget {
    /// Create a new budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max concurrent jobs.
    pub fn with_max_concurrent(mut self, max: NonZeroUsize) -> Self {
        self.max_concurrent = max;
        self
    }
}
