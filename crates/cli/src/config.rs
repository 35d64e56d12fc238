//! `notebook.json` - which interpreters exist and where notes are stored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use notebook_interpreter::{InterpreterSetting, DEFAULT_MULTIPLEX_FALLBACK};
use notebook_note::NoteConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Built-in interpreter implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpreterKind {
    Echo,
    Shell,
}

/// Scheduler an interpreter queues its paragraphs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    #[default]
    Fifo,
    Parallel,
}

/// One configured interpreter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterEntry {
    pub name: String,
    /// Directive the interpreter answers to; the name when absent.
    #[serde(default)]
    pub group: Option<String>,
    pub kind: InterpreterKind,
    #[serde(default)]
    pub scheduler: SchedulerKind,
    /// Only used by the parallel scheduler.
    #[serde(default)]
    pub max_concurrent: Option<usize>,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl InterpreterEntry {
    fn new(name: &str, kind: InterpreterKind) -> Self {
        Self {
            name: name.to_string(),
            group: None,
            kind,
            scheduler: SchedulerKind::Fifo,
            max_concurrent: None,
            properties: HashMap::new(),
        }
    }

    pub fn group(&self) -> &str {
        self.group.as_deref().unwrap_or(&self.name)
    }

    pub fn setting(&self) -> InterpreterSetting {
        InterpreterSetting {
            name: self.name.clone(),
            group: self.group().to_string(),
            properties: self.properties.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub interpreters: Vec<InterpreterEntry>,
    /// Setting used for paragraphs without a directive.
    pub default: Option<String>,
    pub multiplex_fallback: Option<String>,
    /// Root directory of the JSON note repository.
    pub storage: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        let mut jdbc = InterpreterEntry::new("jdbc", InterpreterKind::Echo);
        jdbc.scheduler = SchedulerKind::Parallel;
        jdbc.max_concurrent = Some(4);

        Self {
            interpreters: vec![
                InterpreterEntry::new("md", InterpreterKind::Echo),
                InterpreterEntry::new("sh", InterpreterKind::Shell),
                jdbc,
            ],
            default: Some("md".to_string()),
            multiplex_fallback: Some(DEFAULT_MULTIPLEX_FALLBACK.to_string()),
            storage: PathBuf::from(".notebook"),
        }
    }
}

impl CliConfig {
    /// Load a config file, falling back to the defaults when it does not exist.
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for entry in &self.interpreters {
            if entry.name.is_empty() {
                bail!("Interpreter with empty name");
            }
            if entry.max_concurrent == Some(0) {
                bail!("Interpreter {}: max_concurrent must be at least 1", entry.name);
            }
        }
        if let Some(default) = &self.default {
            if !self.interpreters.iter().any(|e| &e.name == default) {
                bail!("Default interpreter {} is not configured", default);
            }
        }
        Ok(())
    }

    pub fn note_config(&self) -> NoteConfig {
        NoteConfig {
            multiplex_fallback: self.multiplex_fallback.clone(),
        }
    }
}
