//! # cmdrs
//!
//! File: cli/src/lib.rs
//!
//! ## Overview
//!
//! cmdrs is an external-process command layer. It runs operating-system
//! commands and CLI tools, parses their semi-structured text output into
//! typed records, fills user-defined command templates with placeholder
//! values, and runs batches of per-item operations (such as terminating a set
//! of processes) while tolerating and reporting partial failures.
//!
//! The library has no dependency on any UI. The `cmdrs` binary in this crate
//! is one host; others can use the same modules directly.
//!
//! ## Layout
//!
//! - [`core`]: configuration, errors, the command template engine
//! - [`common::process`]: executor, bulk runner, process inventory/control
//! - [`common::parse`]: delimited-table and key/value parsers
//! - [`common::system`]: host environment, tool availability check
//!
pub mod common;
pub mod core;
