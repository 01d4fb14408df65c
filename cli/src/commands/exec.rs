//! # cmdrs Exec Handler
//!
//! File: cli/src/commands/exec.rs
//!
//! ## Overview
//!
//! Implements `cmdrs exec`: hands a command line to the platform shell with
//! the configured timeout and output limit, then relays its output. The
//! process exits with the command's own status.
//!
use crate::commands::Session;
use anyhow::bail;
use clap::Parser;
use cmdrs::common::process::exec;
use cmdrs::core::error::Result;
use std::io::Write;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Run a raw command line through the platform shell")]
pub struct ExecArgs {
    /// The command line. Multiple words are joined with spaces.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

pub async fn handle_exec(args: ExecArgs, session: &Session) -> Result<()> {
    let line = args.command.join(" ");
    info!("Executing shell command: {}", line);
    let result = exec::execute(&session.exec_options().shell(line)).await?;

    print!("{}", result.stdout);
    eprint!("{}", result.stderr);
    std::io::stdout().flush().ok();

    if !result.exit_succeeded {
        match result.exit_code {
            Some(code) => std::process::exit(code),
            None => bail!("Command was terminated by a signal"),
        }
    }
    Ok(())
}
