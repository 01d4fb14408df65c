//! # cmdrs Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process/mod.rs
//!
//! ## Overview
//!
//! Everything that spawns or manages external processes:
//!
//! - **`exec`**: the command executor. One call, one child process, a timeout,
//!   bounded output, classified launch failures.
//! - **`bulk`**: runs a per-item operation over a batch, isolating failures and
//!   reporting a `BulkOutcome`.
//! - **`inventory`**: lists processes and terminates them by identifier or
//!   name, built on `exec`, the table parser and the template engine.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cmdrs::common::process::bulk::no_progress;
//! use cmdrs::common::process::exec::ExecOptions;
//! use cmdrs::common::process::inventory::{KillTarget, ProcessCommands, ProcessControl};
//! use cmdrs::common::system::host::Platform;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let control = ProcessControl::new(
//!     ProcessCommands::for_platform(Platform::current()),
//!     ExecOptions::default(),
//! );
//! let stale: Vec<String> = control
//!     .list_processes()
//!     .await?
//!     .into_iter()
//!     .filter(|p| p.name == "stale-worker")
//!     .map(|p| p.process_id)
//!     .collect();
//! let outcome = control.terminate_many(stale, KillTarget::Id, no_progress).await?;
//! println!("{} terminated, {} failed", outcome.success_count, outcome.failure_count);
//! # Ok(())
//! # }
//! ```
//!

/// Bulk operation runner with per-item failure isolation.
pub mod bulk;
/// The command executor.
pub mod exec;
/// Process listing and termination.
pub mod inventory;
