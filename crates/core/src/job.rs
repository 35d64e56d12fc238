//! Job status and results shared between a paragraph and its running job.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::id::JobId;
use crate::Time;

/// Job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Never submitted, or output cleared
    #[default]
    Ready,
    /// Handed to a scheduler, waiting for a worker
    Pending,
    /// Currently running
    Running,
    /// Completed successfully
    Finished,
    /// Failed, either at submission or while running
    Error,
    /// Aborted before completion
    Abort,
}

impl JobStatus {
    /// Pending or running.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// Finished, failed or aborted.
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Finished | Self::Error | Self::Abort)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Ready => write!(f, "ready"),
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Finished => write!(f, "finished"),
            JobStatus::Error => write!(f, "error"),
            JobStatus::Abort => write!(f, "abort"),
        }
    }
}

/// Outcome reported by an interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    /// Script ran to completion
    Success,
    /// Script needs more input
    Incomplete,
    /// Script failed
    Error,
}

impl ResultCode {
    /// Job status a run ending with this code settles in.
    pub fn terminal_status(self) -> JobStatus {
        match self {
            ResultCode::Error => JobStatus::Error,
            ResultCode::Success | ResultCode::Incomplete => JobStatus::Finished,
        }
    }
}

/// Output of one paragraph run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterResult {
    /// Result code
    pub code: ResultCode,
    /// Output message
    pub message: String,
}

impl InterpreterResult {
    /// Successful result with the given output.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            code: ResultCode::Success,
            message: message.into(),
        }
    }

    /// Failed result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: ResultCode::Error,
            message: message.into(),
        }
    }
}

/// Mutable run state of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobState {
    /// Current status
    pub status: JobStatus,
    /// Job of the most recent submission
    pub job_id: Option<JobId>,
    /// Result of the most recent run
    pub result: Option<InterpreterResult>,
    /// Started timestamp
    pub date_started: Option<Time>,
    /// Finished timestamp
    pub date_finished: Option<Time>,
}

/// Shared handle to a paragraph's [`JobState`].
///
/// The paragraph keeps one end and the submitted job the other, so a
/// scheduler worker can report status and results after `run` returned.
#[derive(Debug, Clone, Default)]
pub struct JobHandle(Arc<Mutex<JobState>>);

impl JobHandle {
    /// Create a handle around an existing state.
    pub fn new(state: JobState) -> Self {
        Self(Arc::new(Mutex::new(state)))
    }

    fn lock(&self) -> MutexGuard<'_, JobState> {
        // The state holds plain data, a panicked writer cannot leave it torn.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> JobState {
        self.lock().clone()
    }

    /// Current status.
    pub fn status(&self) -> JobStatus {
        self.lock().status
    }

    /// Latest result, if any.
    pub fn result(&self) -> Option<InterpreterResult> {
        self.lock().result.clone()
    }

    /// Record a new submission.
    pub fn submitted(&self, job_id: JobId) {
        let mut state = self.lock();
        state.status = JobStatus::Pending;
        state.job_id = Some(job_id);
        state.date_started = None;
        state.date_finished = None;
    }

    /// Whether `job_id` is the most recent submission.
    pub fn is_current(&self, job_id: &JobId) -> bool {
        self.lock().job_id.as_ref() == Some(job_id)
    }

    /// Mark `job_id` as running. Ignored, returning false, once a newer
    /// submission has replaced it.
    pub fn started(&self, job_id: &JobId) -> bool {
        let mut state = self.lock();
        if state.job_id.as_ref() != Some(job_id) {
            return false;
        }
        state.status = JobStatus::Running;
        state.date_started = Some(chrono::Utc::now());
        true
    }

    /// Store the final result of `job_id` and derive the terminal status
    /// from it. Ignored, returning false, once a newer submission has
    /// replaced it.
    pub fn finished(&self, job_id: &JobId, result: InterpreterResult) -> bool {
        let mut state = self.lock();
        if state.job_id.as_ref() != Some(job_id) {
            return false;
        }
        state.status = result.code.terminal_status();
        state.result = Some(result);
        state.date_finished = Some(chrono::Utc::now());
        true
    }

    /// Fail without running, e.g. when no interpreter could be found.
    pub fn failed(&self, message: impl Into<String>) {
        let mut state = self.lock();
        state.status = JobStatus::Error;
        state.result = Some(InterpreterResult::error(message));
        state.date_finished = Some(chrono::Utc::now());
    }

    /// Abort a job that can no longer finish, e.g. after a reload.
    /// Returns whether the job was active.
    pub fn abort_if_active(&self) -> bool {
        let mut state = self.lock();
        if !state.status.is_active() {
            return false;
        }
        state.status = JobStatus::Abort;
        state.date_finished = Some(chrono::Utc::now());
        true
    }

    /// Overwrite the result slot.
    pub fn set_result(&self, result: Option<InterpreterResult>) {
        self.lock().result = result;
    }

    /// Drop output and return to `Ready`.
    pub fn reset(&self) {
        *self.lock() = JobState::default();
    }

    /// Whether both handles point at the same state.
    pub fn same_as(&self, other: &JobHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
