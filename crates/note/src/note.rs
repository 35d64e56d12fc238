//! Note - an ordered collection of paragraphs plus session defaults.

use std::sync::Arc;

use notebook_core::{Directive, JobId, NoteId, NoteSnapshot, Paragraph, ParagraphId};
use notebook_interpreter::{InterpreterContext, ResolverChain, UserCredentials};
use notebook_scheduler::Job;
use tracing::{debug, info, warn};

use crate::{NoteConfig, NoteError, NoteServices, ParagraphJob, Result};

/// A note owns its paragraphs and routes each run to an interpreter.
///
/// Running a paragraph:
/// ```text
/// find paragraph -> parse directive -> resolve interpreter
///   -> rewrite effective text (multiplexed only) -> submit job -> remember name
/// ```
/// `run` returns once the job is queued; the interpreter's scheduler decides
/// when it actually executes.
pub struct Note {
    id: NoteId,
    name: String,
    paragraphs: Vec<Paragraph>,
    last_repl_name: String,
    config: NoteConfig,
    resolver: ResolverChain,
    services: NoteServices,
}

impl Note {
    /// Create an empty note.
    pub fn new(services: NoteServices) -> Self {
        let config = NoteConfig::default();
        Self {
            id: NoteId::new(),
            name: String::new(),
            paragraphs: Vec::new(),
            last_repl_name: String::new(),
            resolver: config.resolver(),
            config,
            services,
        }
    }

    /// Rebuild a note from its persisted form.
    ///
    /// Jobs that were pending or running when the note was saved cannot
    /// report back any more and are marked aborted.
    pub fn from_snapshot(snapshot: NoteSnapshot, services: NoteServices) -> Self {
        for paragraph in &snapshot.paragraphs {
            if paragraph.job_handle().abort_if_active() {
                debug!(note = %snapshot.id, paragraph = %paragraph.id(), "Aborted stale job");
            }
        }

        let mut note = Self::new(services);
        note.id = snapshot.id;
        note.name = snapshot.name;
        note.paragraphs = snapshot.paragraphs;
        note.last_repl_name = snapshot.last_repl_name;
        note
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: NoteConfig) -> Self {
        self.resolver = config.resolver();
        self.config = config;
        self
    }

    /// Replace the resolver chain, e.g. to add extra tiers.
    pub fn with_resolver(mut self, resolver: ResolverChain) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Note id.
    pub fn id(&self) -> &NoteId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the note.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Configuration.
    pub fn config(&self) -> &NoteConfig {
        &self.config
    }

    // === Paragraphs ===

    /// Paragraphs in display order.
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Number of paragraphs.
    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    /// Whether the note has no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Paragraph by id.
    pub fn paragraph(&self, id: &ParagraphId) -> Option<&Paragraph> {
        self.paragraphs.iter().find(|p| p.id() == id)
    }

    /// Mutable paragraph by id.
    pub fn paragraph_mut(&mut self, id: &ParagraphId) -> Option<&mut Paragraph> {
        self.paragraphs.iter_mut().find(|p| p.id() == id)
    }

    /// Last paragraph.
    pub fn last_paragraph(&self) -> Option<&Paragraph> {
        self.paragraphs.last()
    }

    /// Append a paragraph, pre-filled with the last used directive.
    pub fn add_paragraph(&mut self) -> &mut Paragraph {
        let index = self.paragraphs.len();
        self.insert_paragraph(index)
    }

    /// Insert a paragraph at `index`, pre-filled with the last used
    /// directive. An index past the end appends.
    pub fn insert_paragraph(&mut self, index: usize) -> &mut Paragraph {
        let mut paragraph = Paragraph::new();
        if !self.last_repl_name.is_empty() {
            paragraph.set_text(format!("{} ", self.last_interpreter_name()));
        }

        let index = index.min(self.paragraphs.len());
        debug!(note = %self.id, paragraph = %paragraph.id(), index, "Paragraph added");
        self.paragraphs.insert(index, paragraph);
        &mut self.paragraphs[index]
    }

    /// Remove a paragraph and drop it from the search index.
    pub fn remove_paragraph(&mut self, id: &ParagraphId) -> Option<Paragraph> {
        let index = self.position(id)?;
        let removed = self.paragraphs.remove(index);
        self.services.index.delete_paragraph(&self.id, id);
        debug!(note = %self.id, paragraph = %id, "Paragraph removed");
        Some(removed)
    }

    /// Move a paragraph to `index`.
    pub fn move_paragraph(&mut self, id: &ParagraphId, index: usize) -> Result<()> {
        let len = self.paragraphs.len();
        if index >= len {
            return Err(NoteError::IndexOutOfBounds { index, len });
        }
        let from = self
            .position(id)
            .ok_or_else(|| NoteError::ParagraphNotFound(id.clone()))?;
        let paragraph = self.paragraphs.remove(from);
        self.paragraphs.insert(index, paragraph);
        Ok(())
    }

    /// Clear the output of a paragraph.
    pub fn clear_paragraph_output(&self, id: &ParagraphId) -> Result<&Paragraph> {
        let paragraph = self
            .paragraph(id)
            .ok_or_else(|| NoteError::ParagraphNotFound(id.clone()))?;
        paragraph.clear_output();
        Ok(paragraph)
    }

    fn position(&self, id: &ParagraphId) -> Option<usize> {
        self.paragraphs.iter().position(|p| p.id() == id)
    }

    // === Last used interpreter ===

    /// Name of the interpreter used last, empty when unknown.
    pub fn last_repl_name(&self) -> &str {
        &self.last_repl_name
    }

    /// `%name` form of [`Note::last_repl_name`], empty when unknown.
    pub fn last_interpreter_name(&self) -> String {
        if self.last_repl_name.is_empty() {
            String::new()
        } else {
            format!("%{}", self.last_repl_name)
        }
    }

    /// Seed the last used interpreter from the default setting's group.
    pub fn put_default_repl_name(&mut self) {
        self.last_repl_name = self
            .services
            .loader
            .default_setting()
            .map(|setting| setting.group)
            .unwrap_or_default();
    }

    /// Take the last used interpreter from a paragraph's directive.
    pub fn set_last_repl_name(&mut self, id: &ParagraphId) -> Result<()> {
        let name = self
            .paragraph(id)
            .ok_or_else(|| NoteError::ParagraphNotFound(id.clone()))?
            .required_repl_name()
            .to_string();
        self.last_repl_name = name;
        Ok(())
    }

    // === Running ===

    /// Resolve a paragraph's interpreter and submit it to that
    /// interpreter's scheduler. Returns the id of the submitted job.
    ///
    /// Nothing is submitted when resolution fails; the paragraph is then
    /// marked failed and the last used interpreter stays as it was.
    pub fn run(&mut self, id: &ParagraphId) -> Result<JobId> {
        let note_id = self.id.clone();
        let paragraph = self
            .paragraphs
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| NoteError::ParagraphNotFound(id.clone()))?;

        let directive = Directive::parse(paragraph.text());
        let Some(resolved) = self.resolver.resolve(&directive, self.services.loader.as_ref()) else {
            let requested = if directive.is_empty() {
                "default".to_string()
            } else {
                directive.name().to_string()
            };
            warn!(note = %note_id, paragraph = %id, "Interpreter {} not found", requested);
            paragraph.set_effective_text(None);
            let err = NoteError::InterpreterNotFound(requested);
            paragraph.job_handle().failed(err.to_string());
            return Err(err);
        };

        let effective = resolved
            .rewritten
            .then(|| directive.rewrite(paragraph.text(), &resolved.name));
        paragraph.set_effective_text(effective);

        let Some(scheduler) = resolved.interpreter.scheduler() else {
            warn!(note = %note_id, paragraph = %id, "Interpreter {} has no scheduler", resolved.name);
            let err = NoteError::SchedulerUnavailable(resolved.name);
            paragraph.job_handle().failed(err.to_string());
            return Err(err);
        };

        let user = paragraph.user().map(str::to_string);
        let credentials = match &user {
            Some(user) => self.services.credentials.credentials(user),
            None => UserCredentials::default(),
        };
        let context = InterpreterContext {
            note_id: Some(note_id.clone()),
            paragraph_id: Some(id.clone()),
            target: resolved.target.clone(),
            user,
            credentials,
        };
        let job = Arc::new(ParagraphJob::new(
            directive.remainder(),
            context,
            resolved.interpreter.clone(),
            paragraph.job_handle(),
            self.services.listeners.paragraph_listener(&note_id),
        ));
        let job_id = job.id().clone();

        job.mark_pending();
        if let Err(e) = scheduler.submit(job.clone()) {
            warn!(note = %note_id, paragraph = %id, "Submission failed: {}", e);
            job.mark_rejected(e.to_string());
            return Err(e.into());
        }

        self.last_repl_name = if directive.is_empty() {
            resolved.name.clone()
        } else {
            directive.name().to_string()
        };

        info!(
            note = %note_id,
            paragraph = %id,
            job = %job_id,
            interpreter = %resolved.name,
            scheduler = scheduler.name(),
            "Paragraph submitted"
        );
        Ok(job_id)
    }

    /// Run every paragraph in order, stopping at the first failure.
    pub fn run_all(&mut self) -> Result<Vec<JobId>> {
        let ids: Vec<ParagraphId> = self.paragraphs.iter().map(|p| p.id().clone()).collect();
        ids.iter().map(|id| self.run(id)).collect()
    }

    /// Whether no paragraph is pending or running.
    pub fn is_terminated(&self) -> bool {
        self.paragraphs.iter().all(Paragraph::is_terminated)
    }

    // === Persistence ===

    /// Serialisable copy of the note.
    pub fn snapshot(&self) -> NoteSnapshot {
        NoteSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            paragraphs: self.paragraphs.clone(),
            last_repl_name: self.last_repl_name.clone(),
        }
    }

    /// Save the note and refresh its search index entry.
    pub async fn persist(&self) -> Result<()> {
        let snapshot = self.snapshot();
        self.services.repo.save(&snapshot).await?;
        self.services.index.update_note(&snapshot);
        debug!(note = %self.id, "Note persisted");
        Ok(())
    }
}
