//! # cmdrs Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point for the `cmdrs` binary, the host adapter over the `cmdrs`
//! library. It:
//! - parses command-line arguments using Clap
//! - sets up logging from the verbosity flags
//! - detects the host and loads configuration once
//! - routes execution to the command handlers
//!
//! ## Examples
//!
//! ```bash
//! cmdrs --help
//! cmdrs -vv ps list --filter note
//! cmdrs --timeout 5 exec 'ls -la'
//! ```
//!
use anyhow::Context;
use clap::Parser;
use cmdrs::common::system::host::HostEnvironment;
use cmdrs::core::config;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

use commands::Session;

#[derive(Parser, Debug)]
#[command(
    name = "cmdrs",
    about = "Run, template, and parse external commands; list and kill processes",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Per-command timeout in seconds, overriding `executor.timeout_secs`.
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// List and terminate processes.
    Ps(commands::ps::PsArgs),
    /// Compile a command template and run it.
    Run(commands::run::RunArgs),
    /// Run a raw command line through the platform shell.
    Exec(commands::exec::ExecArgs),
    /// Parse tool output from stdin or a file.
    Parse(commands::parse::ParseArgs),
    /// Check whether tools are installed.
    Check(commands::check::CheckArgs),
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let host = HostEnvironment::detect();
    let mut cfg = config::load_config(&host).context("Failed to load cmdrs configuration")?;
    if let Some(secs) = cli.timeout {
        cfg.executor.timeout_secs = secs;
        config::validate_config(&cfg).context("Invalid --timeout")?;
    }
    let session = Session::new(host, cfg);

    match cli.command {
        Commands::Ps(args) => commands::ps::handle_ps(args, &session).await,
        Commands::Run(args) => commands::run::handle_run(args, &session).await,
        Commands::Exec(args) => commands::exec::handle_exec(args, &session).await,
        Commands::Parse(args) => commands::parse::handle_parse(args).await,
        Commands::Check(args) => commands::check::handle_check(args, &session).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
