//! # cmdrs Command Template Engine
//!
//! File: cli/src/core/templating.rs
//!
//! ## Overview
//!
//! This module turns a user-supplied command line such as
//! `notepad.exe "%s"` into an executable name plus an ordered argument list,
//! substituting caller-supplied placeholder values into the arguments.
//!
//! ## Architecture
//!
//! Compilation runs in three steps:
//! 1. Tokenize: a token is either a double-quoted span (quotes removed) or a
//!    maximal run of non-whitespace characters.
//! 2. Split: the first token is the executable, the rest are arguments.
//! 3. Substitute: every occurrence of every placeholder key in each argument
//!    is replaced with its value. The executable name is never substituted and
//!    replacement values are never rescanned.
//!
//! This is not a shell grammar. There are no escapes, variables, or operators;
//! a quote simply groups whitespace into one token.
//!
//! ## Examples
//!
//! ```rust
//! use std::collections::HashMap;
//! use cmdrs::core::templating::compile;
//!
//! let bindings = HashMap::from([("%s".to_string(), "C:/a b.txt".to_string())]);
//! let spec = compile("notepad.exe \"%s\"", &bindings).unwrap();
//! assert_eq!(spec.executable_name, "notepad.exe");
//! assert_eq!(spec.arguments, vec!["C:/a b.txt"]);
//! ```
//!
use crate::common::process::exec::{CommandRequest, ExecOptions};
use crate::core::error::{CmdrsError, TemplateError};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// A compiled command: executable plus discrete arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplateSpec {
    pub executable_name: String,
    pub arguments: Vec<String>,
}

impl CommandTemplateSpec {
    /// Builds an argv-style request; arguments reach the program unshelled.
    pub fn into_request(self, options: &ExecOptions) -> CommandRequest {
        options.argv(self.executable_name, self.arguments)
    }

    /// Joins executable and arguments into one command line, quoting any part that
    /// contains whitespace. Only for executors that accept nothing but a
    /// string; prefer `into_request`.
    pub fn to_command_line(&self) -> String {
        std::iter::once(&self.executable_name)
            .chain(self.arguments.iter())
            .map(|part| quote_if_needed(part))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote_if_needed(part: &str) -> String {
    if part.is_empty() || part.chars().any(char::is_whitespace) {
        format!("\"{}\"", part)
    } else {
        part.to_string()
    }
}

/// Splits a template into tokens, honoring double-quoted spans.
///
/// A quoted span directly adjacent to other characters (`--name="a b"`) stays
/// part of the same token, with its quotes removed.
pub fn tokenize(template: &str) -> Result<Vec<String>, TemplateError> {
    let mut tokens = Vec::new();
    let mut current: Option<String> = None;
    let mut quote_start: Option<usize> = None;

    for (idx, ch) in template.char_indices() {
        match (ch, quote_start) {
            ('"', None) => {
                quote_start = Some(idx);
                current.get_or_insert_with(String::new);
            }
            ('"', Some(_)) => quote_start = None,
            (c, None) if c.is_whitespace() => {
                if let Some(token) = current.take() {
                    tokens.push(token);
                }
            }
            (c, _) => current.get_or_insert_with(String::new).push(c),
        }
    }

    if let Some(position) = quote_start {
        return Err(TemplateError::UnterminatedQuote { position });
    }
    if let Some(token) = current {
        tokens.push(token);
    }
    Ok(tokens)
}

/// Replaces every occurrence of each placeholder in `argument`.
///
/// Each placeholder is applied to the original text segments only, so a
/// value containing another (or the same) placeholder is left untouched.
fn substitute(argument: &str, bindings: &[(&str, &str)]) -> String {
    // Segments of (text, already_substituted).
    let mut segments: Vec<(String, bool)> = vec![(argument.to_string(), false)];
    for &(placeholder, value) in bindings {
        if placeholder.is_empty() {
            continue;
        }
        let mut next = Vec::with_capacity(segments.len());
        for (text, done) in segments {
            if done || !text.contains(placeholder) {
                next.push((text, done));
                continue;
            }
            let mut pieces = text.split(placeholder).peekable();
            while let Some(piece) = pieces.next() {
                if !piece.is_empty() {
                    next.push((piece.to_string(), false));
                }
                if pieces.peek().is_some() {
                    next.push((value.to_string(), true));
                }
            }
        }
        segments = next;
    }
    segments.into_iter().map(|(text, _)| text).collect()
}

/// Compiles `template`, substituting `bindings` into every argument.
pub fn compile(
    template: &str,
    bindings: &HashMap<String, String>,
) -> Result<CommandTemplateSpec, TemplateError> {
    let mut tokens = tokenize(template)?.into_iter();
    let executable_name = tokens.next().ok_or(TemplateError::EmptyTemplate)?;

    // Longest placeholder first, so `%s1` is not eaten by `%s`.
    let mut ordered: Vec<(&str, &str)> = bindings
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));

    let arguments = tokens.map(|arg| substitute(&arg, &ordered)).collect();
    let spec = CommandTemplateSpec {
        executable_name,
        arguments,
    };
    debug!("Compiled command template '{}' into {:?}", template, spec);
    Ok(spec)
}

/// Named templates, typically from the `[templates]` config section.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: BTreeMap<String, String>,
}

impl TemplateSet {
    pub fn new(templates: BTreeMap<String, String>) -> Self {
        TemplateSet { templates }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    /// Compiles the template registered under `name`.
    pub fn compile(
        &self,
        name: &str,
        bindings: &HashMap<String, String>,
    ) -> Result<CommandTemplateSpec, CmdrsError> {
        let template = self.get(name).ok_or_else(|| CmdrsError::UnknownTemplate {
            name: name.to_string(),
        })?;
        Ok(compile(template, bindings)?)
    }
}
