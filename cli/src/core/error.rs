//! # cmdrs Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout cmdrs. Library seams
//! (the executor, the template engine, the bulk runner) return small typed
//! errors so callers can match on a classification instead of inspecting
//! message text. The host adapter wraps everything in `anyhow` for context.
//!
//! ## Architecture
//!
//! - `ExecutionError`: classified failures of a single external command.
//!   `ErrorKind` is the flat classification, obtained via `ExecutionError::kind`.
//! - `TemplateError`: a command template could not be compiled.
//! - `BulkError`: a bulk call was malformed before any item was attempted.
//! - `CmdrsError`: application-level errors (configuration, arguments, lookups).
//! - `Result<T>`: alias for `anyhow::Result<T>` used by host-adapter code.
//!
//! ## Examples
//!
//! ```rust,ignore
//! match process::exec::execute(&request).await {
//!     Ok(result) => println!("{}", result.stdout),
//!     Err(e) if e.kind() == ErrorKind::CommandNotFound => println!("not installed"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```
//!
use std::time::Duration;
use thiserror::Error;

/// Flat classification of an [`ExecutionError`].
///
/// Produced at the point the OS failure is first observed, never reconstructed
/// from message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    CommandNotFound,
    PermissionDenied,
    Timeout,
    OutputTooLarge,
    CommandFailed,
    Io,
}

/// Failure of one external command invocation.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command '{program}' not found.")]
    CommandNotFound { program: String },

    #[error("Permission denied running '{program}'.")]
    PermissionDenied { program: String },

    #[error("Command timed out after {}ms.", .timeout.as_millis())]
    Timeout { timeout: Duration },

    #[error("Command output exceeded the {limit} byte limit.")]
    OutputTooLarge { limit: usize },

    /// Non-zero exit. Only produced by callers that treat a failed exit as
    /// fatal (see `CommandResult::into_success`); the executor itself returns
    /// a `CommandResult` with `exit_succeeded == false`.
    #[error("{}", failed_message(.stderr, .code))]
    CommandFailed { stderr: String, code: Option<i32> },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

fn failed_message(stderr: &str, code: &Option<i32>) -> String {
    let stderr = stderr.trim();
    match (stderr.is_empty(), code) {
        (false, _) => stderr.to_string(),
        (true, Some(code)) => format!("Command exited with status {}.", code),
        (true, None) => "Command terminated by signal.".to_string(),
    }
}

impl ExecutionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutionError::CommandNotFound { .. } => ErrorKind::CommandNotFound,
            ExecutionError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            ExecutionError::Timeout { .. } => ErrorKind::Timeout,
            ExecutionError::OutputTooLarge { .. } => ErrorKind::OutputTooLarge,
            ExecutionError::CommandFailed { .. } => ErrorKind::CommandFailed,
            ExecutionError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ExecutionError::Io {
            context: context.into(),
            source,
        }
    }
}

/// A command template could not be compiled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Command template is empty.")]
    EmptyTemplate,

    /// A `"` opened at byte `position` was never closed.
    #[error("Unterminated quote at position {position} in command template.")]
    UnterminatedQuote { position: usize },
}

/// A bulk call that was rejected before any item was attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BulkError {
    #[error("No items given for bulk operation.")]
    NoItems,
}

/// Application-level errors raised by configuration and the host adapter.
#[derive(Error, Debug)]
pub enum CmdrsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),

    #[error("Unknown command template '{name}'.")]
    UnknownTemplate { name: String },

    #[error("Invalid process identifier '{0}'.")]
    InvalidProcessId(String),

    #[error("Invalid process name '{0}'.")]
    InvalidProcessName(String),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Bulk(#[from] BulkError),
}

/// Type alias for Result using anyhow::Error, for host-adapter code.
pub type Result<T> = anyhow::Result<T>;
