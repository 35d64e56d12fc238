//! Parallel scheduler bounded by a [`Budget`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::intake::{Intake, JobReceiver};
use crate::{Budget, Job, Result, Scheduler};

/// Starts jobs in submission order and runs up to `max_concurrent` at once.
pub struct ParallelScheduler {
    intake: Intake,
    budget: Budget,
}

impl ParallelScheduler {
    /// Start a scheduler and its dispatcher.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(name: impl Into<String>, budget: Budget) -> Arc<Self> {
        let name = name.into();
        let worker_name = name.clone();
        let permits = Arc::new(Semaphore::new(budget.max_concurrent.get()));
        let intake = Intake::spawn(name, move |receiver, queued| {
            dispatch(worker_name, receiver, queued, permits)
        });
        info!(
            scheduler = %intake.name(),
            max_concurrent = budget.max_concurrent.get(),
            "Parallel scheduler started"
        );
        Arc::new(Self { intake, budget })
    }

    /// Concurrency budget.
    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Stop accepting jobs and wait for queued and running jobs to finish.
    pub async fn shutdown(&self) {
        self.intake.shutdown().await;
    }
}

impl Scheduler for ParallelScheduler {
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

async fn dispatch(
    name: String,
    mut receiver: JobReceiver,
    queued: Arc<AtomicUsize>,
    permits: Arc<Semaphore>,
) {
    let mut running = JoinSet::new();

    while let Some(job) = receiver.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            warn!(scheduler = %name, "Permits closed, dropping remaining jobs");
            break;
        };
        queued.fetch_sub(1, Ordering::SeqCst);
        debug!(scheduler = %name, job = %job.id(), "Running {}", job.name());

        running.spawn(async move {
            job.run().await;
            drop(permit);
        });

        // Reap finished jobs so the set does not grow without bound.
        while running.try_join_next().is_some() {}
    }

    while running.join_next().await.is_some() {}
    debug!(scheduler = %name, "Parallel scheduler drained");
}
