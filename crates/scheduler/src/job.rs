//! Job abstraction - the unit of work a scheduler runs.

use async_trait::async_trait;
use notebook_core::{JobId, JobStatus};

/// Work handed to a [`Scheduler`](crate::Scheduler).
///
/// A job reports its own outcome (through whatever state it carries), so
/// `run` has nothing to return. Schedulers only decide *when* it runs.
#[async_trait]
pub trait Job: Send + Sync {
    /// Job id.
    fn id(&self) -> &JobId;

    /// Human readable name, used in logs.
    fn name(&self) -> &str;

    /// Run the job to completion.
    async fn run(&self);
}

/// Observer of job status transitions.
pub trait JobListener: Send + Sync {
    /// Called right before the status changes.
    fn before_status_change(&self, _job: &JobId, _before: JobStatus, _after: JobStatus) {}

    /// Called right after the status changed.
    fn after_status_change(&self, _job: &JobId, _before: JobStatus, _after: JobStatus) {}
}

/// Listener that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl JobListener for NoopListener {}
