//! # Delimited Table Parser (`common::parse::table`)
//!
//! File: cli/src/common/parse/table.rs
//!
//! ## Overview
//!
//! Turns raw comma-delimited tool output into rows of fields.
//!
//! The format handled here is the simplified one real tools emit, not RFC
//! 4180. Double quotes are treated purely as markers and removed before the
//! line is split on commas, so a comma inside a quoted field **does** split
//! that field:
//!
//! ```rust
//! use cmdrs::common::parse::parse_delimited_table;
//!
//! let table = parse_delimited_table("\"svc\",\"Display Name, Extended\",RUNNING");
//! assert_eq!(table[0], vec!["svc", "Display Name", " Extended", "RUNNING"]);
//! ```
//!
//! Callers that know a column may contain commas re-join the overflow
//! themselves (see `ProcessRecord::from_row`).
//!

/// One row's fields, in column order.
pub type ParsedRow = Vec<String>;
/// Rows in input order.
pub type ParsedTable = Vec<ParsedRow>;

const DELIMITER: char = ',';

/// Parses delimited output into rows.
///
/// Lines are split on `\n` or `\r\n`. A line whose first field is empty after
/// trimming (including blank lines) is dropped. Fields are otherwise kept
/// verbatim, surrounding whitespace included.
pub fn parse_delimited_table(raw: &str) -> ParsedTable {
    raw.lines()
        .filter_map(|line| {
            let unquoted = line.replace('"', "");
            let row: ParsedRow = unquoted.split(DELIMITER).map(str::to_string).collect();
            match row.first() {
                Some(first) if !first.trim().is_empty() => Some(row),
                _ => None,
            }
        })
        .collect()
}
