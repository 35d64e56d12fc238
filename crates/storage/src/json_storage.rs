//! JSON file notebook repository.
//!
//! Stores each note as `<root>/<note-id>/note.json`. Writes go to a
//! temporary file first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use notebook_core::{NoteId, NoteSnapshot};
use tokio::fs;
use tracing::{debug, warn};

use super::{NoteInfo, NotebookRepo, Result, StorageError};

const NOTE_FILE: &str = "note.json";

/// File-based JSON notebook repository.
pub struct JsonNotebookRepo {
    root: PathBuf,
}

impl JsonNotebookRepo {
    /// Open a repository rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn note_dir(&self, id: &NoteId) -> PathBuf {
        self.root.join(id.as_str())
    }

    fn note_path(&self, id: &NoteId) -> PathBuf {
        self.note_dir(id).join(NOTE_FILE)
    }
}

#[async_trait]
impl NotebookRepo for JsonNotebookRepo {
    async fn save(&self, note: &NoteSnapshot) -> Result<()> {
        let dir = self.note_dir(&note.id);
        fs::create_dir_all(&dir).await?;

        let json = serde_json::to_string_pretty(note)?;
        let tmp = dir.join(format!("{}.tmp", NOTE_FILE));
        fs::write(&tmp, json.as_bytes()).await?;
        fs::rename(&tmp, self.note_path(&note.id)).await?;

        debug!(note = %note.id, paragraphs = note.paragraphs.len(), "Note saved");
        Ok(())
    }

    async fn get(&self, id: &NoteId) -> Result<Option<NoteSnapshot>> {
        read_json(&self.note_path(id)).await
    }

    async fn list(&self) -> Result<Vec<NoteInfo>> {
        let mut notes = Vec::new();
        let mut rd = fs::read_dir(&self.root).await?;
        while let Some(entry) = rd.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let path = entry.path().join(NOTE_FILE);
            match read_json::<NoteSnapshot>(&path).await {
                Ok(Some(note)) => notes.push(NoteInfo {
                    id: note.id,
                    name: note.name,
                }),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), "Skipping unreadable note: {}", e),
            }
        }
        notes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(notes)
    }

    async fn remove(&self, id: &NoteId) -> Result<()> {
        match fs::remove_dir_all(self.note_dir(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
