//! # Key/Value Line Parser (`common::parse::key_value`)
//!
//! File: cli/src/common/parse/key_value.rs
//!
//! ## Overview
//!
//! Parses lines of the form `Name=notepad.exe`, `ProcessId: 42` or
//! `State    RUNNING` into a map. A line matches when it starts with an
//! identifier followed by a run of separator characters (`=`, `:` or
//! whitespace); everything after the separator, trimmed, is the value.
//! Lines that do not match are skipped. A repeated key overwrites the
//! earlier value.
//!
//! `parse_key_value_blocks` additionally splits the input at blank lines,
//! producing one record per block, which is how list-format tool output
//! separates one object from the next.
//!
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Field name to value.
pub type KeyValueRecord = BTreeMap<String, String>;

static KEY_VALUE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_.\-]*)[\s=:]+(.*)$").expect("static regex is valid")
});

fn parse_line(line: &str) -> Option<(String, String)> {
    let caps = KEY_VALUE_LINE.captures(line)?;
    Some((caps[1].to_string(), caps[2].trim().to_string()))
}

/// Parses every matching line of `raw` into a single record.
pub fn parse_key_value_lines(raw: &str) -> KeyValueRecord {
    raw.lines().filter_map(parse_line).collect()
}

/// Parses `raw` into one record per blank-line separated block. Blocks with
/// no matching line produce no record.
pub fn parse_key_value_blocks(raw: &str) -> Vec<KeyValueRecord> {
    let mut records = Vec::new();
    let mut current = KeyValueRecord::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some((key, value)) = parse_line(line) {
            current.insert(key, value);
        }
    }
    if !current.is_empty() {
        records.push(current);
    }
    records
}
