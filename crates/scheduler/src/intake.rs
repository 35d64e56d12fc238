//! Channel front shared by the scheduler implementations.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{Job, Result, SchedulerError};

pub(crate) type JobReceiver = UnboundedReceiver<Arc<dyn Job>>;

/// Accepts jobs into an unbounded channel drained by one worker task.
pub(crate) struct Intake {
    name: String,
    sender: Mutex<Option<UnboundedSender<Arc<dyn Job>>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    queued: Arc<AtomicUsize>,
}

impl Intake {
    /// Spawn `worker` on the current tokio runtime and return the intake feeding it.
    pub(crate) fn spawn<F, Fut>(name: String, worker: F) -> Self
    where
        F: FnOnce(JobReceiver, Arc<AtomicUsize>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let queued = Arc::new(AtomicUsize::new(0));
        let handle = tokio::spawn(worker(receiver, queued.clone()));
        Self {
            name,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(handle)),
            queued,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn submit(&self, job: Arc<dyn Job>) -> Result<()> {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = sender.as_ref() else {
            return Err(SchedulerError::Closed(self.name.clone()));
        };

        let job_id = job.id().clone();
        self.queued.fetch_add(1, Ordering::SeqCst);
        if sender.send(job).is_err() {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            return Err(SchedulerError::Closed(self.name.clone()));
        }

        debug!(scheduler = %self.name, job = %job_id, "Job queued");
        Ok(())
    }

    pub(crate) fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Stop accepting jobs and wait until everything already accepted has run.
    pub(crate) async fn shutdown(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!(scheduler = %self.name, "Scheduler worker ended abnormally: {}", e);
            }
        }
    }
}
