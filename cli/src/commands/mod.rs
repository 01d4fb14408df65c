//! # cmdrs Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! The command groups of the `cmdrs` binary. Each group defines its own Clap
//! arguments and an async `handle_<group>` function; `main.rs` routes to them.
//!
//! ## Command Groups
//!
//! - `ps`: list and terminate processes
//! - `run`: compile a command template and execute it
//! - `exec`: run a raw shell command line
//! - `parse`: parse tool output from stdin or a file
//! - `check`: report whether tools are installed
//!
//! Handlers receive a shared `Session` holding the detected host and the
//! loaded configuration, so nothing below this layer reads ambient state.
//!
use cmdrs::common::process::exec::ExecOptions;
use cmdrs::common::system::host::HostEnvironment;
use cmdrs::core::config::Config;

pub mod check;
pub mod exec;
pub mod parse;
pub mod ps;
pub mod run;

/// Host facts and configuration resolved once at startup.
#[derive(Debug, Clone)]
pub struct Session {
    pub host: HostEnvironment,
    pub config: Config,
}

impl Session {
    pub fn new(host: HostEnvironment, config: Config) -> Self {
        Session { host, config }
    }

    pub fn exec_options(&self) -> ExecOptions {
        self.config.exec_options()
    }
}
