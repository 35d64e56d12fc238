//! Paragraph job - what a note hands to an interpreter's scheduler.

use std::sync::Arc;

use async_trait::async_trait;
use notebook_core::{JobHandle, JobId, JobStatus};
use notebook_interpreter::{Interpreter, InterpreterContext};
use notebook_scheduler::{Job, JobListener};
use tracing::{debug, info};

/// A paragraph run queued on a scheduler.
///
/// The job holds everything it needs to run on its own, so the note is free
/// to move on (or be edited) once `run` has submitted it. Progress and the
/// result flow back into the paragraph through its [`JobHandle`].
pub struct ParagraphJob {
    id: JobId,
    label: String,
    script: String,
    context: InterpreterContext,
    interpreter: Arc<dyn Interpreter>,
    state: JobHandle,
    listener: Arc<dyn JobListener>,
}

impl ParagraphJob {
    /// Assemble a job.
    pub fn new(
        script: impl Into<String>,
        context: InterpreterContext,
        interpreter: Arc<dyn Interpreter>,
        state: JobHandle,
        listener: Arc<dyn JobListener>,
    ) -> Self {
        let label = context
            .paragraph_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "paragraph".to_string());
        Self {
            id: JobId::new(),
            label,
            script: script.into(),
            context,
            interpreter,
            state,
            listener,
        }
    }

    /// Script body the interpreter will receive.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Context the interpreter will receive.
    pub fn context(&self) -> &InterpreterContext {
        &self.context
    }

    /// Move the paragraph to `Pending` ahead of submission.
    pub(crate) fn mark_pending(&self) {
        let id = self.id.clone();
        self.transition(JobStatus::Pending, |state| state.submitted(id));
    }

    /// Mark the paragraph failed when the scheduler refused the job.
    pub(crate) fn mark_rejected(&self, message: String) {
        self.transition(JobStatus::Error, |state| state.failed(message));
    }

    fn transition(&self, after: JobStatus, apply: impl FnOnce(&JobHandle)) {
        let before = self.state.status();
        self.listener.before_status_change(&self.id, before, after);
        apply(&self.state);
        self.listener.after_status_change(&self.id, before, after);
    }

    /// Report progress of a running job. A job whose paragraph has been
    /// submitted again since is neither written back nor announced.
    fn report(&self, after: JobStatus, apply: impl FnOnce(&JobHandle) -> bool) {
        if !self.state.is_current(&self.id) {
            debug!(job = %self.id, paragraph = %self.label, "Superseded, {} not reported", after);
            return;
        }
        let before = self.state.status();
        self.listener.before_status_change(&self.id, before, after);
        if apply(&self.state) {
            self.listener.after_status_change(&self.id, before, after);
        }
    }
}

#[async_trait]
impl Job for ParagraphJob {
    fn id(&self) -> &JobId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.label
    }

    async fn run(&self) {
        self.report(JobStatus::Running, |state| state.started(&self.id));

        let result = self.interpreter.interpret(&self.script, &self.context).await;
        let after = result.code.terminal_status();
        info!(
            job = %self.id,
            paragraph = %self.label,
            interpreter = self.interpreter.name(),
            status = %after,
            "Paragraph finished"
        );

        self.report(after, |state| state.finished(&self.id, result));
    }
}
