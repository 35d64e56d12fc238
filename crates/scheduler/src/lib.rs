//! Job scheduling - per-interpreter queues that run paragraph jobs
//! asynchronously from the caller.

#![warn(missing_docs)]

mod intake;

pub mod job;
pub mod scheduler;
pub mod fifo;
pub mod parallel;

pub use job::{Job, JobListener, NoopListener};
pub use scheduler::{Budget, Result, Scheduler, SchedulerError};
pub use fifo::FifoScheduler;
pub use parallel::ParallelScheduler;
