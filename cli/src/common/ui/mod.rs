//! # cmdrs Terminal UI Helpers (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! Text rendering for the `cmdrs` binary: a column-aligned process table, a
//! one-line progress indicator for bulk runs, and the three-way bulk summary
//! (success / failure / partial failure). Functions return `String`s; the
//! caller decides where to print them.
//!
use crate::common::parse::KeyValueRecord;
use crate::common::process::bulk::{BulkOutcome, BulkStatus};
use crate::common::process::inventory::ProcessRecord;

const PROCESS_HEADERS: [&str; 5] = ["NAME", "PID", "SESSION", "SESSION#", "MEMORY"];

/// Renders rows as left-aligned columns separated by two spaces. An empty
/// `headers` slice omits the header line.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    if !headers.is_empty() {
        lines.push(format_row(headers.to_vec()));
    }
    lines.extend(
        rows.iter()
            .map(|row| format_row(row.iter().map(String::as_str).collect())),
    );
    lines.join("\n")
}

/// Renders process records under the standard headers.
pub fn render_process_table(records: &[ProcessRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                r.process_id.clone(),
                r.session_name.clone(),
                r.session_number.clone(),
                r.memory_usage.clone(),
            ]
        })
        .collect();
    render_table(&PROCESS_HEADERS, &rows)
}

/// Renders key/value records as `key: value` blocks separated by blank lines.
pub fn render_key_value_records(records: &[KeyValueRecord]) -> String {
    records
        .iter()
        .map(|record| {
            record
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `[3/12]` style progress marker.
pub fn render_progress(completed: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("[{:>width$}/{}]", completed, total, width = width)
}

/// Summary line plus one line per failure message. `label` names the
/// operation, e.g. `Terminate`.
pub fn render_bulk_summary(outcome: &BulkOutcome, label: &str) -> String {
    let headline = match outcome.status() {
        BulkStatus::Success => format!(
            "✅ {}: all {} item(s) succeeded.",
            label, outcome.success_count
        ),
        BulkStatus::Failure => format!(
            "❌ {}: all {} item(s) failed.",
            label, outcome.failure_count
        ),
        BulkStatus::PartialFailure => format!(
            "⚠️ {}: partial failure, {} of {} item(s) succeeded.",
            label,
            outcome.success_count,
            outcome.total()
        ),
    };
    std::iter::once(headline)
        .chain(outcome.error_messages.iter().map(|m| format!("  - {}", m)))
        .collect::<Vec<_>>()
        .join("\n")
}
