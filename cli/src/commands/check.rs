//! # cmdrs Tool Check Handler
//!
//! File: cli/src/commands/check.rs
//!
//! ## Overview
//!
//! Implements `cmdrs check`: checks each named tool and reports whether it
//! resolves on this host. Exits non-zero if any tool is missing.
//!
use crate::commands::Session;
use anyhow::bail;
use clap::Parser;
use cmdrs::common::system::tools;
use cmdrs::core::error::Result;

#[derive(Parser, Debug)]
#[command(about = "Check whether tools are installed")]
pub struct CheckArgs {
    #[arg(required = true)]
    tools: Vec<String>,
}

pub async fn handle_check(args: CheckArgs, session: &Session) -> Result<()> {
    let mut missing = 0;
    for tool in &args.tools {
        if tools::is_tool_available(&session.host, tool).await {
            println!("✅ {}", tool);
        } else {
            println!("❌ {} (not found)", tool);
            missing += 1;
        }
    }
    if missing > 0 {
        bail!("{} of {} tool(s) not available", missing, args.tools.len());
    }
    Ok(())
}
