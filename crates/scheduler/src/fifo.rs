//! First-in first-out scheduler: one job at a time, in submission order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::intake::{Intake, JobReceiver};
use crate::{Job, Result, Scheduler};

/// Runs jobs one after another on a single worker task.
pub struct FifoScheduler {
    intake: Intake,
}

impl FifoScheduler {
    /// Start a scheduler and its worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(name: impl Into<String>) -> Arc<Self> {
        let name = name.into();
        let worker_name = name.clone();
        let intake = Intake::spawn(name, move |receiver, queued| drain(worker_name, receiver, queued));
        info!(scheduler = %intake.name(), "FIFO scheduler started");
        Arc::new(Self { intake })
    }

    /// Stop accepting jobs and wait for the queue to drain.
    pub async fn shutdown(&self) {
        self.intake.shutdown().await;
    }
}

impl Scheduler for FifoScheduler {
    fn name(&self) -> &str {
        self.intake.name()
    }

    fn submit(&self, job: Arc<dyn Job>) -> Result<()> {
        self.intake.submit(job)
    }

    fn queued(&self) -> usize {
        self.intake.queued()
    }
}

async fn drain(name: String, mut receiver: JobReceiver, queued: Arc<AtomicUsize>) {
    while let Some(job) = receiver.recv().await {
        queued.fetch_sub(1, Ordering::SeqCst);
        debug!(scheduler = %name, job = %job.id(), "Running {}", job.name());
        job.run().await;
    }
    debug!(scheduler = %name, "FIFO scheduler drained");
}
