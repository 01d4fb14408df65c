//! # cmdrs Structured Output Parsing (`common::parse`)
//!
//! File: cli/src/common/parse/mod.rs
//!
//! ## Overview
//!
//! Parsers for the semi-structured text that system tools print. Neither
//! parser ever fails: malformed input degrades to fewer (or empty) results.
//!
//! - **`table`**: quoted-CSV-like rows, as printed by `tasklist /FO CSV`,
//!   `sc query` wrappers, `wmic ... /format:csv` and similar.
//! - **`key_value`**: `key=value` (or `key value`) lines, as printed by
//!   `/format:list` style output.
//!
pub mod key_value;
pub mod table;

pub use key_value::{parse_key_value_blocks, parse_key_value_lines, KeyValueRecord};
pub use table::{parse_delimited_table, ParsedRow, ParsedTable};
