//! # cmdrs Parse Handler
//!
//! File: cli/src/commands/parse.rs
//!
//! ## Overview
//!
//! Implements `cmdrs parse`, a front end for the structured output parsers.
//! Reads tool output from `--file` or stdin and prints it as aligned columns
//! (`table`) or as `key: value` blocks (`kv`).
//!
//! ```bash
//! tasklist /FO CSV /NH | cmdrs parse table
//! wmic os get /format:list | cmdrs parse kv
//! ```
//!
use anyhow::Context;
use clap::{Parser, ValueEnum};
use cmdrs::common::{parse, ui};
use cmdrs::core::error::Result;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseFormat {
    /// Quoted comma-separated rows.
    Table,
    /// `key=value` lines, blank-line separated records.
    Kv,
}

#[derive(Parser, Debug)]
#[command(about = "Parse tool output from stdin or a file")]
pub struct ParseArgs {
    #[arg(value_enum)]
    format: ParseFormat,

    /// Read from this file instead of stdin.
    #[arg(long, short)]
    file: Option<PathBuf>,
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn render(format: ParseFormat, raw: &str) -> String {
    match format {
        ParseFormat::Table => ui::render_table(&[], &parse::parse_delimited_table(raw)),
        ParseFormat::Kv => ui::render_key_value_records(&parse::parse_key_value_blocks(raw)),
    }
}

pub async fn handle_parse(args: ParseArgs) -> Result<()> {
    let raw = read_input(args.file.as_ref())?;
    debug!("Parsing {} bytes as {:?}", raw.len(), args.format);
    let rendered = render(args.format, &raw);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    Ok(())
}
