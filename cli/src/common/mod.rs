//! # cmdrs Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared utility modules used by the CLI commands and available to any other
//! host through the library crate:
//!
//! - **`parse`**: parsers for delimited and key/value tool output.
//! - **`process`**: the command executor, the bulk runner, and process
//!   inventory/control.
//! - **`system`**: the host environment and tool availability checks.
//! - **`ui`**: terminal rendering of process tables and bulk summaries. Only
//!   the binary uses it; the rest of the library never prints.
//!

/// Parsers for semi-structured command output.
pub mod parse;
/// Executing external commands and managing processes.
pub mod process;
/// Host environment values and tool detection.
pub mod system;
/// Terminal output helpers for the CLI.
pub mod ui;
