//! Note configuration.

use notebook_interpreter::{ResolverChain, DEFAULT_MULTIPLEX_FALLBACK};
use serde::{Deserialize, Serialize};

/// Settings controlling how paragraphs are routed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteConfig {
    /// Interpreter serving directive names that are not bound directly,
    /// e.g. `jdbc` turns `%mysql` into `%jdbc(mysql)`. `None` disables it.
    pub multiplex_fallback: Option<String>,
}

impl Default for NoteConfig {
    fn default() -> Self {
        Self {
            multiplex_fallback: Some(DEFAULT_MULTIPLEX_FALLBACK.to_string()),
        }
    }
}

impl NoteConfig {
    /// Resolver chain for this configuration.
    pub fn resolver(&self) -> ResolverChain {
        ResolverChain::new(self.multiplex_fallback.as_deref())
    }
}
