//! # cmdrs Process Kill Handler
//!
//! File: cli/src/commands/ps/kill.rs
//!
//! ## Overview
//!
//! Implements `cmdrs ps kill`. Every target is attempted even when earlier
//! ones fail; the command prints a progress marker per target and a summary,
//! then exits non-zero unless every termination succeeded.
//!
use crate::commands::Session;
use anyhow::bail;
use clap::Parser;
use cmdrs::common::process::bulk::BulkStatus;
use cmdrs::common::process::inventory::{KillTarget, ProcessControl};
use cmdrs::common::ui;
use cmdrs::core::error::Result;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Forcibly terminate processes")]
pub struct KillArgs {
    /// Process identifiers (or names, with --by-name).
    #[arg(required = true)]
    targets: Vec<String>,

    /// Treat targets as process image names instead of identifiers.
    #[arg(long, short = 'n')]
    by_name: bool,

    /// Number of terminations to run at once. Defaults to `bulk.concurrency`.
    #[arg(long, short = 'j')]
    jobs: Option<usize>,
}

pub async fn handle_kill(args: KillArgs, session: &Session) -> Result<()> {
    let target = if args.by_name {
        KillTarget::Name
    } else {
        KillTarget::Id
    };
    info!("Terminating {} target(s) as {:?}", args.targets.len(), target);

    let mut control = ProcessControl::from_config(&session.config, &session.host);
    if let Some(jobs) = args.jobs {
        control = control.with_concurrency(jobs);
    }

    let outcome = control
        .terminate_many(args.targets, target, |done, total| {
            eprintln!("{} done", ui::render_progress(done, total));
        })
        .await?;

    println!("{}", ui::render_bulk_summary(&outcome, "Terminate"));
    match outcome.status() {
        BulkStatus::Success => Ok(()),
        _ => bail!(
            "{} of {} termination(s) failed",
            outcome.failure_count,
            outcome.total()
        ),
    }
}
