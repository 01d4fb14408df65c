//! # cmdrs Process List Handler
//!
//! File: cli/src/commands/ps/list.rs
//!
//! ## Overview
//!
//! Implements `cmdrs ps list`: runs the platform's process-listing command,
//! parses its CSV rows, and prints them as an aligned table.
//!
use crate::commands::Session;
use anyhow::Context;
use clap::Parser;
use cmdrs::common::process::inventory::{ProcessControl, ProcessRecord};
use cmdrs::common::ui;
use cmdrs::core::error::Result;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "List running processes")]
pub struct ListArgs {
    /// Only show processes whose name contains this text (case-insensitive).
    #[arg(long, short)]
    filter: Option<String>,
}

fn apply_filter(records: Vec<ProcessRecord>, filter: Option<&str>) -> Vec<ProcessRecord> {
    let Some(filter) = filter.map(str::to_lowercase) else {
        return records;
    };
    records
        .into_iter()
        .filter(|r| r.name.to_lowercase().contains(&filter))
        .collect()
}

pub async fn handle_list(args: ListArgs, session: &Session) -> Result<()> {
    info!("Handling ps list (filter: {:?})", args.filter);
    let control = ProcessControl::from_config(&session.config, &session.host);
    let records = control
        .list_processes()
        .await
        .context("Failed to list processes")?;
    let records = apply_filter(records, args.filter.as_deref());

    if records.is_empty() {
        println!("No matching processes found.");
    } else {
        println!("{}", ui::render_process_table(&records));
        println!("\n{} process(es).", records.len());
    }
    Ok(())
}
