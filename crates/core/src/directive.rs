//! Interpreter directive parsing.
//!
//! A paragraph may start with a `%name` token that selects the interpreter
//! which should run it:
//!
//! ```text
//! %spark sc.version
//! %jdbc(mysql) show databases
//! ```
//!
//! Everything after the token and the whitespace that follows it is the
//! script body. Parsing never fails: text without a leading directive
//! simply yields an empty name.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(%(\S+))").expect("directive pattern is valid"));

/// The leading `%name` directive of a paragraph, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Directive {
    name: String,
    /// Byte range of the `%name` token within the parsed text.
    span: Option<Range<usize>>,
    remainder: String,
}

impl Directive {
    /// Parse the leading directive of `text`.
    pub fn parse(text: &str) -> Self {
        let Some(caps) = DIRECTIVE.captures(text) else {
            return Self {
                name: String::new(),
                span: None,
                remainder: text.to_string(),
            };
        };

        // Both groups are mandatory in the pattern.
        let (Some(token), Some(name)) = (caps.get(1), caps.get(2)) else {
            return Self {
                name: String::new(),
                span: None,
                remainder: text.to_string(),
            };
        };

        Self {
            name: name.as_str().to_string(),
            span: Some(token.range()),
            remainder: text[token.end()..].trim_start().to_string(),
        }
    }

    /// Directive name as written, e.g. `spark` or `jdbc(mysql)`. Empty when absent.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the text carried no directive.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Interpreter part of the name: `jdbc` for `jdbc(mysql)`.
    pub fn engine(&self) -> &str {
        match split_target(&self.name) {
            Some((engine, _)) => engine,
            None => &self.name,
        }
    }

    /// Multiplex target carried in parentheses: `mysql` for `jdbc(mysql)`.
    pub fn target(&self) -> Option<&str> {
        split_target(&self.name).map(|(_, target)| target)
    }

    /// Script body following the directive.
    pub fn remainder(&self) -> &str {
        &self.remainder
    }

    /// Replace the directive token of `text` with `%replacement`.
    ///
    /// `text` must be the text this directive was parsed from. Everything
    /// outside the token, including the separating whitespace, is kept as is.
    /// Without a directive the text is returned unchanged.
    pub fn rewrite(&self, text: &str, replacement: &str) -> String {
        match &self.span {
            Some(span) if span.end <= text.len() => {
                let mut out = String::with_capacity(text.len() + replacement.len() + 1);
                out.push_str(&text[..span.start]);
                out.push('%');
                out.push_str(replacement);
                out.push_str(&text[span.end..]);
                out
            }
            _ => text.to_string(),
        }
    }
}

/// Format the multiplexed name `fallback(target)`.
pub fn multiplexed_name(fallback: &str, target: &str) -> String {
    format!("{}({})", fallback, target)
}

fn split_target(name: &str) -> Option<(&str, &str)> {
    let inner = name.strip_suffix(')')?;
    let open = inner.find('(')?;
    let (engine, target) = (&inner[..open], &inner[open + 1..]);
    if engine.is_empty() || target.is_empty() {
        return None;
    }
    Some((engine, target))
}
