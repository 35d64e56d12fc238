//! Note error types.

use notebook_core::ParagraphId;
use notebook_scheduler::SchedulerError;
use notebook_storage::StorageError;

/// Error type for note operations.
pub type Result<T> = std::result::Result<T, NoteError>;

/// Errors that can occur during note operations.
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    /// No paragraph with this id in the note
    #[error("Paragraph {0} not found")]
    ParagraphNotFound(ParagraphId),

    /// The directive resolved to no interpreter
    #[error("Interpreter {0} not found")]
    InterpreterNotFound(String),

    /// The resolved interpreter has no usable scheduler
    #[error("Interpreter {0} has no scheduler")]
    SchedulerUnavailable(String),

    /// The scheduler refused the job
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Persistence failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Paragraph position out of range
    #[error("Index {index} out of bounds for {len} paragraphs")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of paragraphs
        len: usize,
    },
}
