//! Notebook repository abstraction.

use async_trait::async_trait;
use notebook_core::{NoteId, NoteSnapshot};
use serde::{Deserialize, Serialize};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Summary of a stored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteInfo {
    /// Note id
    pub id: NoteId,
    /// Display name
    pub name: String,
}

/// Durable storage for notes.
///
/// This trait allows different storage backends to be plugged in.
#[async_trait]
pub trait NotebookRepo: Send + Sync {
    /// Save a note (create or update).
    async fn save(&self, note: &NoteSnapshot) -> Result<()>;

    /// Load a note by ID.
    async fn get(&self, id: &NoteId) -> Result<Option<NoteSnapshot>>;

    /// List stored notes.
    async fn list(&self) -> Result<Vec<NoteInfo>>;

    /// Delete a note.
    async fn remove(&self, id: &NoteId) -> Result<()>;
}
