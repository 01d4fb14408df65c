//! # cmdrs Process Inventory & Control (`common::process::inventory`)
//!
//! File: cli/src/common/process/inventory.rs
//!
//! ## Overview
//!
//! Lists OS processes and terminates them, by identifier or by name, by
//! combining the executor, the delimited-table parser and the template
//! engine. The actual system commands are data (`ProcessCommands`) so they
//! can be overridden from configuration.
//!
//! ## Architecture
//!
//! - **Listing** goes through a `ProcessLister`. A `Shell` lister runs a
//!   command line whose output must be headerless quoted-CSV rows with the
//!   columns `name, pid, session name, session number, memory usage`, which
//!   is what `tasklist /FO CSV /NH` prints. On Unix the default is `Ps`: `ps`
//!   is spawned directly (so its own failure is reported) and its
//!   whitespace-separated columns are mapped onto the same record shape.
//! - **Termination** compiles `kill_by_id` / `kill_by_name` with the target
//!   bound to `{pid}` / `{name}` and runs the result as discrete arguments.
//!   Success requires a zero exit status.
//!
//! Killing by name may terminate several processes that share the name; that
//! is how the underlying tools behave.
//!
use crate::common::process::bulk::{self, BulkOutcome};
use crate::common::process::exec::{self, CommandRequest, ExecOptions};
use crate::common::parse::{parse_delimited_table, ParsedRow};
use crate::common::system::host::{HostEnvironment, Platform};
use crate::common::system::tools::strip_shell_metacharacters;
use crate::core::config::{Config, ProcessConfig, NAME_PLACEHOLDER, PID_PLACEHOLDER};
use crate::core::error::{BulkError, CmdrsError, ExecutionError};
use crate::core::templating;
use std::collections::HashMap;
use tracing::{debug, info};

const WINDOWS_LIST: &str = "tasklist /FO CSV /NH";
const WINDOWS_KILL_BY_ID: &str = "taskkill /F /PID {pid}";
const WINDOWS_KILL_BY_NAME: &str = "taskkill /F /IM {name}";

const PS_PROGRAM: &str = "ps";
const PS_ARGS: [&str; 11] = [
    "-A", "-o", "pid=", "-o", "tty=", "-o", "sess=", "-o", "rss=", "-o", "comm=",
];
const UNIX_KILL_BY_ID: &str = "kill -9 {pid}";
const UNIX_KILL_BY_NAME: &str = "pkill -9 -x {name}";

/// Number of positional columns in a process row.
const PROCESS_COLUMNS: usize = 5;

/// One row of the process listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessRecord {
    pub name: String,
    pub process_id: String,
    pub session_name: String,
    pub session_number: String,
    pub memory_usage: String,
}

impl ProcessRecord {
    /// Maps row fields 0..4 positionally. Missing fields become empty.
    ///
    /// The memory column is the one that can contain a comma (`15,000 K`),
    /// which the table parser splits. Any fields past the fifth are therefore
    /// joined back onto the memory column with commas.
    pub fn from_row(row: &[String]) -> Self {
        let field = |i: usize| row.get(i).cloned().unwrap_or_default();
        let memory_usage = if row.len() > PROCESS_COLUMNS {
            row[PROCESS_COLUMNS - 1..].join(",")
        } else {
            field(PROCESS_COLUMNS - 1)
        };
        ProcessRecord {
            name: field(0),
            process_id: field(1),
            session_name: field(2),
            session_number: field(3),
            memory_usage,
        }
    }
}

/// Maps a parsed process table into records.
pub fn records_from_table(rows: &[ParsedRow]) -> Vec<ProcessRecord> {
    rows.iter().map(|row| ProcessRecord::from_row(row)).collect()
}

/// Maps `ps -o pid= -o tty= -o sess= -o rss= -o comm=` output into records.
///
/// The command name is last and may contain spaces. Lines with fewer than
/// five columns have no name and are dropped.
pub fn records_from_ps(raw: &str) -> Vec<ProcessRecord> {
    raw.lines()
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let process_id = columns.next()?;
            let tty = columns.next()?;
            let session = columns.next()?;
            let rss = columns.next()?;
            let name = columns.collect::<Vec<_>>().join(" ");
            if name.is_empty() {
                return None;
            }
            Some(ProcessRecord {
                name,
                process_id: process_id.to_string(),
                session_name: tty.to_string(),
                session_number: session.to_string(),
                memory_usage: format!("{} K", rss),
            })
        })
        .collect()
}

/// How the process table is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessLister {
    /// A shell line printing headerless quoted-CSV rows.
    Shell(String),
    /// `ps` run directly, its columns mapped by `records_from_ps`.
    Ps,
}

/// The system commands used for listing and terminating processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommands {
    pub lister: ProcessLister,
    /// Template containing `{pid}`.
    pub kill_by_id: String,
    /// Template containing `{name}`.
    pub kill_by_name: String,
}

impl ProcessCommands {
    pub fn for_platform(platform: Platform) -> Self {
        let (list, by_id, by_name) = match platform {
            Platform::Windows => (
                ProcessLister::Shell(WINDOWS_LIST.to_string()),
                WINDOWS_KILL_BY_ID,
                WINDOWS_KILL_BY_NAME,
            ),
            Platform::Unix => (ProcessLister::Ps, UNIX_KILL_BY_ID, UNIX_KILL_BY_NAME),
        };
        ProcessCommands {
            lister: list,
            kill_by_id: by_id.to_string(),
            kill_by_name: by_name.to_string(),
        }
    }

    /// Replaces platform defaults with whatever the config sets.
    pub fn with_overrides(mut self, overrides: &ProcessConfig) -> Self {
        if let Some(list) = &overrides.list_command {
            self.lister = ProcessLister::Shell(list.clone());
        }
        if let Some(by_id) = &overrides.kill_by_id {
            self.kill_by_id = by_id.clone();
        }
        if let Some(by_name) = &overrides.kill_by_name {
            self.kill_by_name = by_name.clone();
        }
        self
    }
}

/// How `terminate_many` addresses its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillTarget {
    Id,
    Name,
}

/// Lists and terminates processes.
#[derive(Debug, Clone)]
pub struct ProcessControl {
    commands: ProcessCommands,
    options: ExecOptions,
    concurrency: usize,
}

impl ProcessControl {
    pub fn new(commands: ProcessCommands, options: ExecOptions) -> Self {
        ProcessControl {
            commands,
            options,
            concurrency: 1,
        }
    }

    /// Platform defaults overlaid with the `[process]`, `[executor]` and
    /// `[bulk]` config sections.
    pub fn from_config(config: &Config, host: &HostEnvironment) -> Self {
        let commands = ProcessCommands::for_platform(host.platform).with_overrides(&config.process);
        ProcessControl::new(commands, config.exec_options()).with_concurrency(config.bulk.concurrency)
    }

    /// Sets how many terminations `terminate_many` runs at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn commands(&self) -> &ProcessCommands {
        &self.commands
    }

    /// Enumerates running processes.
    ///
    /// # Errors
    ///
    /// Any `ExecutionError` from running the listing command, including
    /// `CommandFailed` if it exits non-zero, or if it prints nothing on stdout
    /// but something on stderr (a failed stage of a pipeline whose last
    /// stage still exited zero). Malformed rows are not errors.
    pub async fn list_processes(&self) -> Result<Vec<ProcessRecord>, ExecutionError> {
        let records = match &self.commands.lister {
            ProcessLister::Shell(line) => {
                let stdout = self.run_lister(self.options.shell(line.clone())).await?;
                records_from_table(&parse_delimited_table(&stdout))
            }
            ProcessLister::Ps => records_from_ps(&self.list_with_ps(PS_PROGRAM).await?),
        };
        debug!("Listed {} processes", records.len());
        Ok(records)
    }

    async fn list_with_ps(&self, program: &str) -> Result<String, ExecutionError> {
        self.run_lister(self.options.argv(program, PS_ARGS)).await
    }

    async fn run_lister(&self, request: CommandRequest) -> Result<String, ExecutionError> {
        let result = exec::execute(&request).await?.into_success()?;
        if result.stdout.trim().is_empty() && !result.stderr.trim().is_empty() {
            return Err(ExecutionError::CommandFailed {
                stderr: result.stderr,
                code: result.exit_code,
            });
        }
        Ok(result.stdout)
    }

    /// Forcibly terminates the process with identifier `process_id`.
    ///
    /// # Errors
    ///
    /// `CmdrsError::InvalidProcessId` unless `process_id` is a non-empty run
    /// of ASCII digits; otherwise the `ExecutionError` of the kill command.
    pub async fn terminate_by_identifier(&self, process_id: &str) -> Result<(), CmdrsError> {
        let process_id = process_id.trim();
        if process_id.is_empty() || !process_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(CmdrsError::InvalidProcessId(process_id.to_string()));
        }
        self.run_kill(&self.commands.kill_by_id, PID_PLACEHOLDER, process_id)
            .await?;
        info!("Terminated process {}", process_id);
        Ok(())
    }

    /// Forcibly terminates every process named `name`.
    ///
    /// # Errors
    ///
    /// `CmdrsError::InvalidProcessName` if nothing is left of `name` after
    /// stripping shell metacharacters; otherwise the kill command's error.
    pub async fn terminate_by_name(&self, name: &str) -> Result<(), CmdrsError> {
        let name = strip_shell_metacharacters(name);
        if name.is_empty() {
            return Err(CmdrsError::InvalidProcessName(name));
        }
        self.run_kill(&self.commands.kill_by_name, NAME_PLACEHOLDER, &name)
            .await?;
        info!("Terminated processes named '{}'", name);
        Ok(())
    }

    async fn run_kill(
        &self,
        template: &str,
        placeholder: &str,
        value: &str,
    ) -> Result<(), CmdrsError> {
        let bindings = HashMap::from([(placeholder.to_string(), value.to_string())]);
        let spec = templating::compile(template, &bindings)?;
        exec::execute(&spec.into_request(&self.options))
            .await?
            .into_success()?;
        Ok(())
    }

    /// Terminates every target, continuing past failures.
    pub async fn terminate_many<P>(
        &self,
        targets: Vec<String>,
        target: KillTarget,
        on_progress: P,
    ) -> Result<BulkOutcome, BulkError>
    where
        P: FnMut(usize, usize),
    {
        let operation = |t: String| async move {
            let result = match target {
                KillTarget::Id => self.terminate_by_identifier(&t).await,
                KillTarget::Name => self.terminate_by_name(&t).await,
            };
            result.map_err(|e| format!("{}: {}", t, e))
        };
        if self.concurrency > 1 {
            bulk::run_bulk_concurrent(targets, self.concurrency, operation, on_progress).await
        } else {
            bulk::run_bulk(targets, operation, on_progress).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::process::bulk::{no_progress, BulkStatus};
    use crate::core::error::ErrorKind;

    /// Whether `program` exists as a file on PATH. `ps` and `kill` come from
    /// procps, which minimal images may lack.
    fn has_program(program: &str) -> bool {
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
            .unwrap_or(false)
    }

    fn row(fields: &[&str]) -> ParsedRow {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn control_with(overrides: ProcessConfig) -> ProcessControl {
        ProcessControl::new(
            ProcessCommands::for_platform(Platform::Unix).with_overrides(&overrides),
            ExecOptions::default(),
        )
    }

    #[test]
    fn test_from_row_embedded_comma_in_memory() {
        let table =
            parse_delimited_table("\"notepad.exe\",\"1234\",\"Console\",\"1\",\"15,000 K\"");
        let records = records_from_table(&table);
        assert_eq!(
            records,
            vec![ProcessRecord {
                name: "notepad.exe".into(),
                process_id: "1234".into(),
                session_name: "Console".into(),
                session_number: "1".into(),
                memory_usage: "15,000 K".into(),
            }]
        );
    }

    #[test]
    fn test_from_row_missing_fields_default_empty() {
        let record = ProcessRecord::from_row(&row(&["init", "1"]));
        assert_eq!(record.name, "init");
        assert_eq!(record.process_id, "1");
        assert_eq!(record.session_name, "");
        assert_eq!(record.memory_usage, "");
    }

    #[test]
    fn test_from_row_many_overflow_fields() {
        let record = ProcessRecord::from_row(&row(&["big", "2", "Console", "1", "1", "234", "567 K"]));
        assert_eq!(record.memory_usage, "1,234,567 K");
    }

    #[test]
    fn test_commands_overrides() {
        let overrides = ProcessConfig {
            kill_by_name: Some("killall {name}".into()),
            ..ProcessConfig::default()
        };
        let commands = ProcessCommands::for_platform(Platform::Windows).with_overrides(&overrides);
        assert_eq!(commands.lister, ProcessLister::Shell(WINDOWS_LIST.to_string()));
        assert_eq!(commands.kill_by_id, WINDOWS_KILL_BY_ID);
        assert_eq!(commands.kill_by_name, "killall {name}");
    }

    #[test]
    fn test_from_config_uses_host_platform() {
        let host = HostEnvironment {
            home_dir: None,
            platform: Platform::Windows,
        };
        let control = ProcessControl::from_config(&Config::default(), &host);
        assert_eq!(
            control.commands().lister,
            ProcessLister::Shell(WINDOWS_LIST.to_string())
        );
        assert_eq!(control.concurrency, 1);
    }

    #[tokio::test]
    async fn test_invalid_identifiers_rejected_before_execution() {
        let control = control_with(ProcessConfig::default());
        for bad in ["", "  ", "-1", "12a", "1;reboot"] {
            let err = control.terminate_by_identifier(bad).await.unwrap_err();
            assert!(matches!(err, CmdrsError::InvalidProcessId(_)), "{:?}", bad);
        }
        let err = control.terminate_by_name(";|&").await.unwrap_err();
        assert!(matches!(err, CmdrsError::InvalidProcessName(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_processes_from_configured_command() {
        let control = control_with(ProcessConfig {
            list_command: Some(
                r#"printf '%s\r\n' '"notepad.exe","1234","Console","1","15,000 K"' '' '"","9"' '"sh","77"'"#
                    .into(),
            ),
            ..ProcessConfig::default()
        });
        let records = control.list_processes().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].memory_usage, "15,000 K");
        assert_eq!(records[1].name, "sh");
        assert_eq!(records[1].session_name, "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_processes_failure_surfaces() {
        let control = control_with(ProcessConfig {
            list_command: Some("echo broken >&2; exit 2".into()),
            ..ProcessConfig::default()
        });
        let err = control.list_processes().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandFailed);
        assert_eq!(err.to_string(), "broken");
    }

    #[test]
    fn test_records_from_ps_columns() {
        let raw = "    1 ?        1   1024 systemd\n 4242 pts/0  4100  15000 Web Content\n 77 ?   77  12\n\n";
        let records = records_from_ps(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[1],
            ProcessRecord {
                name: "Web Content".into(),
                process_id: "4242".into(),
                session_name: "pts/0".into(),
                session_number: "4100".into(),
                memory_usage: "15000 K".into(),
            }
        );
        assert_eq!(records[0].name, "systemd");
    }

    #[test]
    fn test_unix_default_lister_is_ps() {
        let commands = ProcessCommands::for_platform(Platform::Unix);
        assert_eq!(commands.lister, ProcessLister::Ps);
        let overrides = ProcessConfig {
            list_command: Some("my-lister".into()),
            ..ProcessConfig::default()
        };
        assert_eq!(
            commands.with_overrides(&overrides).lister,
            ProcessLister::Shell("my-lister".into())
        );
    }

    #[tokio::test]
    async fn test_missing_ps_is_command_not_found() {
        let control = control_with(ProcessConfig::default());
        let err = control.list_with_ps("cmdrs-no-such-ps").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandNotFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_pipeline_stage_is_not_an_empty_listing() {
        let control = control_with(ProcessConfig {
            list_command: Some("cmdrs-no-such-ps -A | cat".into()),
            ..ProcessConfig::default()
        });
        let err = control.list_processes().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandFailed);
        assert!(err.to_string().contains("cmdrs-no-such-ps"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_listing_without_stderr_is_ok() {
        let control = control_with(ProcessConfig {
            list_command: Some("true".into()),
            ..ProcessConfig::default()
        });
        assert_eq!(control.list_processes().await.unwrap(), Vec::new());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_default_listing_includes_current_process() {
        if !has_program("ps") {
            return;
        }
        let control = control_with(ProcessConfig::default());
        let records = control.list_processes().await.unwrap();
        let me = std::process::id().to_string();
        assert!(records.iter().any(|r| r.process_id == me));
        assert!(records.iter().all(|r| r.memory_usage.ends_with(" K")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_by_identifier_kills_child() {
        if !has_program("kill") {
            return;
        }
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        let pid = child.id().unwrap().to_string();

        let control = control_with(ProcessConfig::default());
        control.terminate_by_identifier(&pid).await.unwrap();

        let status = child.wait().await.unwrap();
        assert!(!status.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_missing_process_is_command_failed() {
        if !has_program("kill") {
            return;
        }
        let control = control_with(ProcessConfig::default());
        // Above the largest pid_max Linux allows.
        let err = control.terminate_by_identifier("4194304").await.unwrap_err();
        match err {
            CmdrsError::Execution(e) => assert_eq!(e.kind(), ErrorKind::CommandFailed),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_by_name_substitutes_stripped_name() {
        let control = control_with(ProcessConfig {
            kill_by_name: Some("test {name} = note.exe".into()),
            ..ProcessConfig::default()
        });
        control.terminate_by_name("note.exe;").await.unwrap();
        assert!(control.terminate_by_name("other.exe").await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_many_partial_failure() {
        if !has_program("kill") {
            return;
        }
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        let pid = child.id().unwrap().to_string();

        let control = control_with(ProcessConfig::default());
        let mut progress = Vec::new();
        let outcome = control
            .terminate_many(
                vec![pid, "4194304".to_string()],
                KillTarget::Id,
                |done, total| progress.push((done, total)),
            )
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.failure_count, 1);
        assert!(outcome.error_messages[0].starts_with("4194304: "));
        assert_eq!(outcome.status(), BulkStatus::PartialFailure);
        assert_eq!(progress, vec![(1, 2), (2, 2)]);
        assert!(!child.wait().await.unwrap().success());
    }

    #[tokio::test]
    async fn test_terminate_many_empty_is_rejected() {
        let control = control_with(ProcessConfig::default());
        let result = control
            .terminate_many(Vec::new(), KillTarget::Name, no_progress)
            .await;
        assert_eq!(result, Err(BulkError::NoItems));
    }
}
