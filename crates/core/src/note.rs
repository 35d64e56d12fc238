//! Serialisable view of a note, exchanged with persistence.

use serde::{Deserialize, Serialize};

use crate::id::NoteId;
use crate::paragraph::Paragraph;

/// Persisted form of a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSnapshot {
    /// Note id
    pub id: NoteId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Paragraphs in display order
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
    /// Interpreter used last, pre-fills new paragraphs
    #[serde(default)]
    pub last_repl_name: String,
}
