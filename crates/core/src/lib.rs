//! Notebook core data models.
//!
//! This crate defines the paragraph and note data structures, the
//! interpreter directive parser and the job state shared between a
//! paragraph and the scheduler that runs it.

#![warn(missing_docs)]

// Core identities
mod id;

// Paragraph text and directives
pub mod directive;
mod paragraph;

// Run state
mod job;

// Persistence view
mod note;

// Re-exports
pub use id::*;

pub use directive::{multiplexed_name, Directive};
pub use paragraph::Paragraph;
pub use job::{InterpreterResult, JobHandle, JobState, JobStatus, ResultCode};
pub use note::NoteSnapshot;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
