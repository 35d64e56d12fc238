//! Storage abstraction and implementations for notes.
//!
//! This crate provides a trait-based notebook repository with a JSON file
//! reference implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;

pub use trait_::{NoteInfo, NotebookRepo, Result, StorageError};
pub use json_storage::JsonNotebookRepo;
