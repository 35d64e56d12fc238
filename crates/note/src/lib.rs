//! Notes - paragraph routing and submission.
//!
//! A [`Note`] resolves each paragraph's `%directive` to an interpreter,
//! rewrites multiplexed directives, and queues the paragraph as a
//! [`ParagraphJob`] on the interpreter's scheduler.

#![warn(missing_docs)]

pub mod collaborators;
pub mod config;
pub mod error;
pub mod job;
pub mod note;

pub use collaborators::{
    CredentialStore, InMemoryCredentials, JobListenerFactory, NoopSearchIndex, NoteServices,
    SearchIndex, TracingListenerFactory,
};
pub use config::NoteConfig;
pub use error::{NoteError, Result};
pub use job::ParagraphJob;
pub use note::Note;
