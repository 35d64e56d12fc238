//! Paragraph model - one unit of user-authored code.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::directive::Directive;
use crate::id::ParagraphId;
use crate::job::{InterpreterResult, JobHandle, JobState, JobStatus};
use crate::Time;

/// A paragraph is a piece of code plus the state of its last run.
///
/// `text` is what the user wrote. `effective_text` is what gets sent to the
/// interpreter and only differs from `text` after a multiplexed resolution
/// rewrote the directive. Editing the text always drops the rewrite.
#[derive(Debug)]
pub struct Paragraph {
    id: ParagraphId,
    title: Option<String>,
    text: String,
    effective_text: Option<String>,
    required_repl_name: String,
    user: Option<String>,
    date_created: Time,
    date_updated: Time,
    job: JobHandle,
}

impl Paragraph {
    /// Create an empty paragraph with a fresh id.
    pub fn new() -> Self {
        Self::with_id(ParagraphId::new())
    }

    /// Create an empty paragraph with the given id.
    pub fn with_id(id: ParagraphId) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            title: None,
            text: String::new(),
            effective_text: None,
            required_repl_name: String::new(),
            user: None,
            date_created: now,
            date_updated: now,
            job: JobHandle::default(),
        }
    }

    /// Paragraph id.
    pub fn id(&self) -> &ParagraphId {
        &self.id
    }

    /// Text as authored.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text. Recomputes the required interpreter name and resets
    /// the effective text until the next resolution.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.required_repl_name = Directive::parse(&self.text).name().to_string();
        self.effective_text = None;
        self.date_updated = chrono::Utc::now();
    }

    /// Text sent to the interpreter.
    pub fn effective_text(&self) -> &str {
        self.effective_text.as_deref().unwrap_or(&self.text)
    }

    /// Set the rewritten form of the text. `None` falls back to `text`.
    pub fn set_effective_text(&mut self, effective_text: Option<String>) {
        self.effective_text = effective_text;
    }

    /// Directive name of the text, empty when none.
    pub fn required_repl_name(&self) -> &str {
        &self.required_repl_name
    }

    /// Text after the directive.
    pub fn script_body(&self) -> String {
        Directive::parse(&self.text).remainder().to_string()
    }

    /// Optional title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Set the title.
    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
        self.date_updated = chrono::Utc::now();
    }

    /// User the paragraph runs as.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Set the user the paragraph runs as.
    pub fn set_user(&mut self, user: Option<String>) {
        self.user = user;
    }

    /// Creation timestamp.
    pub fn date_created(&self) -> Time {
        self.date_created
    }

    /// Last edit timestamp.
    pub fn date_updated(&self) -> Time {
        self.date_updated
    }

    /// Current job status.
    pub fn status(&self) -> JobStatus {
        self.job.status()
    }

    /// Result of the last run.
    pub fn result(&self) -> Option<InterpreterResult> {
        self.job.result()
    }

    /// Overwrite the result slot.
    pub fn set_result(&self, result: Option<InterpreterResult>) {
        self.job.set_result(result);
    }

    /// Shared handle a submitted job writes its progress into.
    pub fn job_handle(&self) -> JobHandle {
        self.job.clone()
    }

    /// Drop the output of the last run.
    pub fn clear_output(&self) {
        self.job.reset();
    }

    /// Not pending and not running.
    pub fn is_terminated(&self) -> bool {
        !self.status().is_active()
    }
}

/// Cloning detaches: the copy gets its own job state, seeded from the
/// current one, so jobs still running keep reporting to the original only.
impl Clone for Paragraph {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            text: self.text.clone(),
            effective_text: self.effective_text.clone(),
            required_repl_name: self.required_repl_name.clone(),
            user: self.user.clone(),
            date_created: self.date_created,
            date_updated: self.date_updated,
            job: JobHandle::new(self.job.snapshot()),
        }
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ParagraphView<'a> {
    id: &'a ParagraphId,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
    date_created: Time,
    date_updated: Time,
    job: JobState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParagraphRecord {
    id: ParagraphId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    user: Option<String>,
    date_created: Time,
    date_updated: Time,
    #[serde(default)]
    job: JobState,
}

impl Serialize for Paragraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ParagraphView {
            id: &self.id,
            title: self.title.as_deref(),
            text: &self.text,
            user: self.user.as_deref(),
            date_created: self.date_created,
            date_updated: self.date_updated,
            job: self.job.snapshot(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Paragraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = ParagraphRecord::deserialize(deserializer)?;
        let required_repl_name = Directive::parse(&record.text).name().to_string();
        Ok(Self {
            id: record.id,
            title: record.title,
            text: record.text,
            effective_text: None,
            required_repl_name,
            user: record.user,
            date_created: record.date_created,
            date_updated: record.date_updated,
            job: JobHandle::new(record.job),
        })
    }
}
