//! Interpreter bindings available to a note.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::{Interpreter, InterpreterSetting};

/// Binding set consulted when a paragraph runs.
///
/// Maps directive names to interpreters and knows the default setting used
/// for paragraphs without a directive. Implementations hand out `Arc`s so a
/// lookup never holds a lock beyond the call.
pub trait InterpreterLoader: Send + Sync {
    /// Interpreter bound to a directive name.
    fn get(&self, name: &str) -> Option<Arc<dyn Interpreter>>;

    /// Primary setting of the note, if any is configured.
    fn default_setting(&self) -> Option<InterpreterSetting>;

    /// Interpreter of the default setting's group.
    fn default_interpreter(&self) -> Option<Arc<dyn Interpreter>> {
        let setting = self.default_setting()?;
        self.get(&setting.group)
    }
}

#[derive(Default)]
struct Bindings {
    /// Settings in configuration order; the first one is the default.
    settings: Vec<InterpreterSetting>,
    by_name: HashMap<String, Arc<dyn Interpreter>>,
}

/// In-memory binding set.
#[derive(Default)]
pub struct InterpreterRegistry {
    inner: RwLock<Bindings>,
}

impl InterpreterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a setting and bind its interpreter under the group name,
    /// and under the setting name when that differs and is still free.
    pub fn register(&self, setting: InterpreterSetting, interpreter: Arc<dyn Interpreter>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        debug!(setting = %setting.name, group = %setting.group, "Registering interpreter");

        inner
            .by_name
            .insert(setting.group.clone(), interpreter.clone());
        if setting.name != setting.group {
            inner
                .by_name
                .entry(setting.name.clone())
                .or_insert(interpreter);
        }

        inner.settings.retain(|s| s.name != setting.name);
        inner.settings.push(setting);
    }

    /// Bind an extra directive name, e.g. `pyspark` inside the spark group.
    pub fn bind(&self, name: impl Into<String>, interpreter: Arc<dyn Interpreter>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.by_name.insert(name.into(), interpreter);
    }

    /// Remove a directive binding.
    pub fn unbind(&self, name: &str) -> Option<Arc<dyn Interpreter>> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.by_name.remove(name)
    }

    /// Make the named setting the default. Returns false if it is unknown.
    pub fn set_default(&self, setting_name: &str) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let Some(pos) = inner.settings.iter().position(|s| s.name == setting_name) else {
            return false;
        };
        let setting = inner.settings.remove(pos);
        inner.settings.insert(0, setting);
        true
    }

    /// Settings in order, default first.
    pub fn settings(&self) -> Vec<InterpreterSetting> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .settings
            .clone()
    }

    /// Bound directive names, sorted.
    pub fn names(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = inner.by_name.keys().cloned().collect();
        names.sort();
        names
    }
}

impl InterpreterLoader for InterpreterRegistry {
    fn get(&self, name: &str) -> Option<Arc<dyn Interpreter>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_name
            .get(name)
            .cloned()
    }

    fn default_setting(&self) -> Option<InterpreterSetting> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .settings
            .first()
            .cloned()
    }
}
