//! Interpreter abstraction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use notebook_core::{InterpreterResult, NoteId, ParagraphId};
use notebook_scheduler::Scheduler;
use serde::{Deserialize, Serialize};

/// A named execution backend.
///
/// The interpreter owns the scheduler its paragraphs are queued on; the
/// note never schedules work itself.
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Interpreter name.
    fn name(&self) -> &str;

    /// Scheduler paragraph jobs are submitted to. `None` when the
    /// interpreter cannot accept work.
    fn scheduler(&self) -> Option<Arc<dyn Scheduler>>;

    /// Run a script body.
    async fn interpret(&self, script: &str, context: &InterpreterContext) -> InterpreterResult;
}

/// Information passed to an interpreter together with the script.
#[derive(Debug, Clone, Default)]
pub struct InterpreterContext {
    /// Note the paragraph belongs to
    pub note_id: Option<NoteId>,
    /// Paragraph being run
    pub paragraph_id: Option<ParagraphId>,
    /// Target of a multiplexed interpreter, e.g. `mysql` for `jdbc(mysql)`
    pub target: Option<String>,
    /// User the paragraph runs as
    pub user: Option<String>,
    /// Credentials of that user
    pub credentials: UserCredentials,
}

/// Configuration of a group of interpreters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterSetting {
    /// Setting name
    pub name: String,
    /// Interpreter group, also the directive of its main interpreter
    pub group: String,
    /// Interpreter properties
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl InterpreterSetting {
    /// Create a setting whose name equals its group.
    pub fn new(group: impl Into<String>) -> Self {
        let group = group.into();
        Self {
            name: group.clone(),
            group,
            properties: HashMap::new(),
        }
    }

    /// Set a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Username and password for one entity (e.g. a database).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernamePassword {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl std::fmt::Debug for UsernamePassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsernamePassword")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Per-user credentials keyed by entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredentials {
    entries: HashMap<String, UsernamePassword>,
}

impl UserCredentials {
    /// Empty credentials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store credentials for an entity.
    pub fn put(&mut self, entity: impl Into<String>, creds: UsernamePassword) {
        self.entries.insert(entity.into(), creds);
    }

    /// Credentials for an entity.
    pub fn get(&self, entity: &str) -> Option<&UsernamePassword> {
        self.entries.get(entity)
    }

    /// Whether no entity has credentials.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
