//! Services a note depends on but does not own.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use notebook_core::{JobId, JobStatus, NoteId, NoteSnapshot, ParagraphId};
use notebook_interpreter::{InterpreterLoader, UserCredentials};
use notebook_scheduler::JobListener;
use notebook_storage::NotebookRepo;
use tracing::{debug, info};

/// Full-text index over notes.
pub trait SearchIndex: Send + Sync {
    /// (Re)index a note.
    fn update_note(&self, note: &NoteSnapshot);

    /// Drop a paragraph from the index.
    fn delete_paragraph(&self, note_id: &NoteId, paragraph_id: &ParagraphId);
}

/// Index that indexes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSearchIndex;

impl SearchIndex for NoopSearchIndex {
    fn update_note(&self, _note: &NoteSnapshot) {}

    fn delete_paragraph(&self, _note_id: &NoteId, _paragraph_id: &ParagraphId) {}
}

/// Source of per-user credentials handed to interpreters.
pub trait CredentialStore: Send + Sync {
    /// Credentials of `user`; empty when none are stored.
    fn credentials(&self, user: &str) -> UserCredentials;
}

/// Credential store kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryCredentials {
    by_user: RwLock<HashMap<String, UserCredentials>>,
}

impl InMemoryCredentials {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the credentials of a user.
    pub fn put(&self, user: impl Into<String>, credentials: UserCredentials) {
        self.by_user
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.into(), credentials);
    }
}

impl CredentialStore for InMemoryCredentials {
    fn credentials(&self, user: &str) -> UserCredentials {
        self.by_user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user)
            .cloned()
            .unwrap_or_default()
    }
}

/// Creates the listener attached to each paragraph job of a note.
pub trait JobListenerFactory: Send + Sync {
    /// Listener for jobs of the given note.
    fn paragraph_listener(&self, note_id: &NoteId) -> Arc<dyn JobListener>;
}

/// Factory producing listeners that log status changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListenerFactory;

impl JobListenerFactory for TracingListenerFactory {
    fn paragraph_listener(&self, note_id: &NoteId) -> Arc<dyn JobListener> {
        Arc::new(TracingListener {
            note_id: note_id.clone(),
        })
    }
}

struct TracingListener {
    note_id: NoteId,
}

impl JobListener for TracingListener {
    fn before_status_change(&self, job: &JobId, before: JobStatus, after: JobStatus) {
        debug!(note = %self.note_id, job = %job, "{} -> {}", before, after);
    }

    fn after_status_change(&self, job: &JobId, _before: JobStatus, after: JobStatus) {
        if after.is_completed() {
            info!(note = %self.note_id, job = %job, status = %after, "Paragraph job completed");
        }
    }
}

/// Everything a note is constructed with.
#[derive(Clone)]
pub struct NoteServices {
    /// Durable storage
    pub repo: Arc<dyn NotebookRepo>,
    /// Interpreter bindings of the note
    pub loader: Arc<dyn InterpreterLoader>,
    /// Listener factory for paragraph jobs
    pub listeners: Arc<dyn JobListenerFactory>,
    /// Search index
    pub index: Arc<dyn SearchIndex>,
    /// Credential store
    pub credentials: Arc<dyn CredentialStore>,
}
