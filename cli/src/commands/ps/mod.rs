//! # cmdrs Process Command Group
//!
//! File: cli/src/commands/ps/mod.rs
//!
//! ## Overview
//!
//! Router for `cmdrs ps`. Subcommands:
//!
//! ```bash
//! # Show every process, or only those whose name contains "note"
//! cmdrs ps list
//! cmdrs ps list --filter note
//!
//! # Kill by identifier, or by image name
//! cmdrs ps kill 1234 5678
//! cmdrs ps kill --by-name notepad.exe
//! ```
//!
use super::Session;
use cmdrs::core::error::Result;
use clap::{Parser, Subcommand};

mod kill;
mod list;

#[derive(Parser, Debug)]
pub struct PsArgs {
    #[command(subcommand)]
    command: PsCommand,
}

#[derive(Subcommand, Debug)]
enum PsCommand {
    /// List running processes.
    #[command(alias = "ls")]
    List(list::ListArgs),
    /// Forcibly terminate processes by identifier or name.
    Kill(kill::KillArgs),
}

pub async fn handle_ps(args: PsArgs, session: &Session) -> Result<()> {
    match args.command {
        PsCommand::List(args) => list::handle_list(args, session).await,
        PsCommand::Kill(args) => kill::handle_kill(args, session).await,
    }
}
