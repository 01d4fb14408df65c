//! # cmdrs Template Run Handler
//!
//! File: cli/src/commands/run.rs
//!
//! ## Overview
//!
//! Implements `cmdrs run`: compiles a command template (given literally, or
//! looked up by name in the `[templates]` config section with `--named`),
//! then executes the result without a shell so substituted values reach the
//! program as single arguments.
//!
//! ```bash
//! cmdrs run 'notepad.exe "%s"' --set '%s=C:/notes/a b.txt'
//! cmdrs run edit --named --set '%s=README.md'
//! ```
//!
use crate::commands::Session;
use anyhow::{bail, Context};
use clap::Parser;
use cmdrs::common::process::exec;
use cmdrs::core::error::{CmdrsError, Result};
use cmdrs::core::templating::{self, TemplateSet};
use std::collections::HashMap;
use std::io::Write;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(about = "Compile a command template and run it")]
pub struct RunArgs {
    /// The template text, or a template name with --named.
    template: String,

    /// Placeholder binding, e.g. `--set %s=file.txt`. Repeatable.
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE", value_parser = parse_binding)]
    bindings: Vec<(String, String)>,

    /// Look the template up in the `[templates]` config section.
    #[arg(long)]
    named: bool,

    /// Print the compiled command instead of running it.
    #[arg(long)]
    dry_run: bool,
}

/// Splits `KEY=VALUE` at the first `=`. The value may be empty; the key may not.
fn parse_binding(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(CmdrsError::ArgumentParsing(format!(
            "expected KEY=VALUE, got '{}'",
            raw
        ))
        .to_string()),
    }
}

pub async fn handle_run(args: RunArgs, session: &Session) -> Result<()> {
    let bindings: HashMap<String, String> = args.bindings.into_iter().collect();
    let spec = if args.named {
        TemplateSet::new(session.config.templates.clone()).compile(&args.template, &bindings)?
    } else {
        templating::compile(&args.template, &bindings)?
    };
    info!("Running {}", spec.to_command_line());

    if args.dry_run {
        println!("{}", spec.to_command_line());
        return Ok(());
    }

    let program = spec.executable_name.clone();
    let result = exec::execute(&spec.into_request(&session.exec_options()))
        .await
        .with_context(|| format!("Failed to run '{}'", program))?;
    debug!("'{}' finished with code {:?}", program, result.exit_code);

    print!("{}", result.stdout);
    eprint!("{}", result.stderr);
    std::io::stdout().flush().ok();

    if !result.exit_succeeded {
        match result.exit_code {
            Some(code) => bail!("'{}' exited with status {}", program, code),
            None => bail!("'{}' was terminated by a signal", program),
        }
    }
    Ok(())
}
