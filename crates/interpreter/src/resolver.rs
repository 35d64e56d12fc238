//! Directive to interpreter resolution.
//!
//! Resolution runs an ordered chain of tiers and stops at the first hit:
//!
//! ```text
//! (no directive)   -> DefaultResolver    -> default setting's interpreter
//! %spark           -> DirectResolver     -> loader.get("spark")
//! %mysql (unbound) -> MultiplexResolver  -> loader.get("jdbc"), name "jdbc(mysql)"
//! ```
//!
//! The multiplex tier is consulted once; it never chains into another
//! fallback.

use std::sync::Arc;

use notebook_core::{multiplexed_name, Directive};
use tracing::debug;

use crate::{Interpreter, InterpreterLoader};

/// Fallback interpreter serving unbound directive names by default.
pub const DEFAULT_MULTIPLEX_FALLBACK: &str = "jdbc";

/// Outcome of a successful resolution.
#[derive(Clone)]
pub struct Resolved {
    /// Interpreter to run on
    pub interpreter: Arc<dyn Interpreter>,
    /// Effective directive name: `spark`, or `jdbc(mysql)` when multiplexed.
    /// For the default interpreter this is its group.
    pub name: String,
    /// Multiplex target passed to the interpreter
    pub target: Option<String>,
    /// Whether the paragraph text must be rewritten to `%<name>`
    pub rewritten: bool,
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("interpreter", &self.interpreter.name())
            .field("name", &self.name)
            .field("target", &self.target)
            .field("rewritten", &self.rewritten)
            .finish()
    }
}

/// One tier of the resolution chain.
pub trait InterpreterResolver: Send + Sync {
    /// Tier name, used in logs.
    fn name(&self) -> &str;

    /// Resolve or pass to the next tier by returning `None`.
    fn resolve(&self, directive: &Directive, loader: &dyn InterpreterLoader) -> Option<Resolved>;
}

/// Paragraphs without a directive go to the default setting's interpreter.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultResolver;

impl InterpreterResolver for DefaultResolver {
    fn name(&self) -> &str {
        "default"
    }

    fn resolve(&self, directive: &Directive, loader: &dyn InterpreterLoader) -> Option<Resolved> {
        if !directive.is_empty() {
            return None;
        }
        let setting = loader.default_setting()?;
        let interpreter = loader.get(&setting.group)?;
        Some(Resolved {
            interpreter,
            name: setting.group,
            target: None,
            rewritten: false,
        })
    }
}

/// Looks the directive up by name.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectResolver;

impl InterpreterResolver for DirectResolver {
    fn name(&self) -> &str {
        "direct"
    }

    fn resolve(&self, directive: &Directive, loader: &dyn InterpreterLoader) -> Option<Resolved> {
        if directive.is_empty() {
            return None;
        }
        let interpreter = loader.get(directive.engine())?;
        Some(Resolved {
            interpreter,
            name: directive.name().to_string(),
            target: directive.target().map(str::to_string),
            rewritten: false,
        })
    }
}

/// Routes an unbound name through a generic interpreter that dispatches to
/// many targets, e.g. `%mysql` through `jdbc` as `%jdbc(mysql)`.
#[derive(Debug, Clone)]
pub struct MultiplexResolver {
    fallback: String,
}

impl MultiplexResolver {
    /// Create a tier falling back to `fallback`.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }

    /// Fallback interpreter name.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl InterpreterResolver for MultiplexResolver {
    fn name(&self) -> &str {
        "multiplex"
    }

    fn resolve(&self, directive: &Directive, loader: &dyn InterpreterLoader) -> Option<Resolved> {
        // Already multiplexed names and the fallback itself never take a second hop.
        if directive.is_empty() || directive.target().is_some() || directive.engine() == self.fallback {
            return None;
        }
        let interpreter = loader.get(&self.fallback)?;
        Some(Resolved {
            interpreter,
            name: multiplexed_name(&self.fallback, directive.name()),
            target: Some(directive.name().to_string()),
            rewritten: true,
        })
    }
}

/// Ordered list of resolution tiers.
pub struct ResolverChain {
    tiers: Vec<Box<dyn InterpreterResolver>>,
}

impl ResolverChain {
    /// Default, direct, then multiplex through `fallback` when one is given.
    pub fn new(fallback: Option<&str>) -> Self {
        let chain = Self::empty()
            .with_tier(DefaultResolver)
            .with_tier(DirectResolver);
        match fallback {
            Some(fallback) => chain.with_tier(MultiplexResolver::new(fallback)),
            None => chain,
        }
    }

    /// Chain without tiers; resolves nothing.
    pub fn empty() -> Self {
        Self { tiers: Vec::new() }
    }

    /// Append a tier.
    pub fn with_tier(mut self, tier: impl InterpreterResolver + 'static) -> Self {
        self.tiers.push(Box::new(tier));
        self
    }

    /// Tier names in order.
    pub fn tiers(&self) -> Vec<&str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    /// Resolve a directive against a loader snapshot.
    pub fn resolve(&self, directive: &Directive, loader: &dyn InterpreterLoader) -> Option<Resolved> {
        for tier in &self.tiers {
            if let Some(resolved) = tier.resolve(directive, loader) {
                debug!(
                    tier = tier.name(),
                    directive = directive.name(),
                    resolved = %resolved.name,
                    "Interpreter resolved"
                );
                return Some(resolved);
            }
        }
        debug!(directive = directive.name(), "No interpreter resolved");
        None
    }
}

impl Default for ResolverChain {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MULTIPLEX_FALLBACK))
    }
}
