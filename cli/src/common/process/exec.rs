//! # cmdrs Command Executor (`common::process::exec`)
//!
//! File: cli/src/common/process/exec.rs
//!
//! ## Overview
//!
//! The executor is the only place cmdrs touches the operating system's
//! process API. Each call spawns exactly one child, waits for it under a
//! timeout, and returns the captured output or a classified `ExecutionError`.
//!
//! ## Architecture
//!
//! A `CommandRequest` is either:
//! - **Shell**: a single command line run through the platform shell, prefixed
//!   with a directive that switches the console to UTF-8
//!   (`chcp 65001 >nul &&` on Windows, `export LC_ALL=C.UTF-8;` elsewhere).
//!   The directive's own output is discarded inside the shell.
//! - **Argv**: a program and discrete arguments, spawned directly with no
//!   shell involved. The UTF-8 locale is set through the child environment.
//!
//! Both stdout and stderr are drained concurrently into memory. When their
//! combined size passes `max_output_bytes` the child is killed and
//! `OutputTooLarge` is returned. When the timeout expires the child is killed
//! and `Timeout` is returned; partial output is discarded.
//!
//! On Unix every child leads its own process group, and killing means
//! `SIGKILL` to the whole group, so anything a shell line started in the
//! foreground or background goes with it. On Windows the tree is ended with
//! `taskkill /T`. A descendant that moved itself into another group (a
//! daemonizing `setsid`) is beyond reach.
//!
//! A non-zero exit is **not** an error here: the result carries
//! `exit_succeeded == false` and the caller decides. The exceptions are the
//! launch failures: the program could not be found, or could not be executed.
//! For argv requests these come from the spawn error itself. For shell
//! requests they come from the shell's reserved exit statuses (127/126 for
//! POSIX shells, 9009 for `cmd.exe`), and only when stderr also carries the
//! shell's own diagnostic (`not found`, `Permission denied`,
//! `is not recognized`). A line that simply ends in `exit 127` is an ordinary
//! non-zero exit.
//!
use crate::core::error::{ErrorKind, ExecutionError};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

#[cfg(unix)]
use nix::sys::signal::{killpg, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

#[cfg(windows)]
const ENCODING_PREAMBLE: &str = "chcp 65001 >nul 2>&1 && ";
#[cfg(not(windows))]
const ENCODING_PREAMBLE: &str = "export LC_ALL=C.UTF-8 2>/dev/null; ";

/// Default timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default bound on combined stdout + stderr.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

const READ_CHUNK: usize = 8192;

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// Interpreted by the platform shell.
    Shell(String),
    /// Spawned directly; arguments are passed as-is.
    Argv { program: String, args: Vec<String> },
}

impl CommandLine {
    /// The name used in `CommandNotFound` / `PermissionDenied` errors.
    fn program_label(&self) -> &str {
        match self {
            CommandLine::Shell(line) => line.split_whitespace().next().unwrap_or(""),
            CommandLine::Argv { program, .. } => program,
        }
    }
}

/// Settings shared by every request built from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    pub timeout: Duration,
    pub max_output_bytes: usize,
    pub working_directory: Option<PathBuf>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        ExecOptions {
            timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            working_directory: None,
        }
    }
}

impl ExecOptions {
    pub fn shell(&self, line: impl Into<String>) -> CommandRequest {
        self.request(CommandLine::Shell(line.into()))
    }

    pub fn argv<I, S>(&self, program: impl Into<String>, args: I) -> CommandRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request(CommandLine::Argv {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        })
    }

    fn request(&self, command: CommandLine) -> CommandRequest {
        CommandRequest {
            command,
            working_directory: self.working_directory.clone(),
            timeout: self.timeout,
            max_output_bytes: self.max_output_bytes,
        }
    }
}

/// One invocation. Output is always decoded as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub command: CommandLine,
    pub working_directory: Option<PathBuf>,
    pub timeout: Duration,
    pub max_output_bytes: usize,
}

/// Captured output of a command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_succeeded: bool,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl CommandResult {
    /// Treats a non-zero exit as an error.
    pub fn into_success(self) -> Result<CommandResult, ExecutionError> {
        if self.exit_succeeded {
            Ok(self)
        } else {
            Err(ExecutionError::CommandFailed {
                stderr: self.stderr,
                code: self.exit_code,
            })
        }
    }
}

fn build_command(request: &CommandRequest) -> Command {
    let mut cmd = match &request.command {
        CommandLine::Shell(line) => shell_command(line),
        CommandLine::Argv { program, args } => {
            let mut cmd = Command::new(program);
            cmd.args(args);
            #[cfg(not(windows))]
            cmd.env("LC_ALL", "C.UTF-8");
            cmd
        }
    };
    if let Some(dir) = &request.working_directory {
        cmd.current_dir(dir);
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);
    cmd
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").raw_arg(format!("{}{}", ENCODING_PREAMBLE, line));
    cmd
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(format!("{}{}", ENCODING_PREAMBLE, line));
    cmd
}

/// Maps a spawn failure to its classification.
fn classify_spawn_error(program: &str, err: std::io::Error) -> ExecutionError {
    match err.kind() {
        std::io::ErrorKind::NotFound => ExecutionError::CommandNotFound {
            program: program.to_string(),
        },
        std::io::ErrorKind::PermissionDenied => ExecutionError::PermissionDenied {
            program: program.to_string(),
        },
        _ => ExecutionError::io(format!("Failed to start '{}'", program), err),
    }
}

/// Maps the shell's reserved "could not launch" statuses, when stderr holds
/// the matching shell diagnostic.
fn classify_shell_status(program: &str, code: Option<i32>, stderr: &str) -> Option<ExecutionError> {
    let stderr = stderr.to_lowercase();
    let says = |markers: &[&str]| markers.iter().any(|m| stderr.contains(m));
    let program = program.to_string();
    match code {
        Some(127) if cfg!(not(windows)) && says(&["not found"]) => {
            Some(ExecutionError::CommandNotFound { program })
        }
        Some(126) if cfg!(not(windows)) && says(&["permission denied", "cannot execute"]) => {
            Some(ExecutionError::PermissionDenied { program })
        }
        Some(9009) if cfg!(windows) && says(&["is not recognized"]) => {
            Some(ExecutionError::CommandNotFound { program })
        }
        _ => None,
    }
}

/// Drains both pipes until EOF, enforcing the combined size limit.
async fn collect_output<O, E>(
    mut stdout: O,
    mut stderr: E,
    limit: usize,
) -> Result<(Vec<u8>, Vec<u8>), ExecutionError>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut out = Vec::new();
    let mut err = Vec::new();
    let mut out_buf = [0u8; READ_CHUNK];
    let mut err_buf = [0u8; READ_CHUNK];
    let (mut out_done, mut err_done) = (false, false);

    while !(out_done && err_done) {
        tokio::select! {
            read = stdout.read(&mut out_buf), if !out_done => {
                match read.map_err(|e| ExecutionError::io("Failed to read stdout", e))? {
                    0 => out_done = true,
                    n => out.extend_from_slice(&out_buf[..n]),
                }
            }
            read = stderr.read(&mut err_buf), if !err_done => {
                match read.map_err(|e| ExecutionError::io("Failed to read stderr", e))? {
                    0 => err_done = true,
                    n => err.extend_from_slice(&err_buf[..n]),
                }
            }
        }
        if out.len() + err.len() > limit {
            return Err(ExecutionError::OutputTooLarge { limit });
        }
    }
    Ok((out, err))
}

async fn run_to_completion(
    child: &mut Child,
    limit: usize,
) -> Result<(Vec<u8>, Vec<u8>, ExitStatus), ExecutionError> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ExecutionError::io("Failed to capture stdout", broken_pipe()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| ExecutionError::io("Failed to capture stderr", broken_pipe()))?;
    let (out, err) = collect_output(stdout, stderr, limit).await?;
    let status = child
        .wait()
        .await
        .map_err(|e| ExecutionError::io("Failed to wait for process", e))?;
    Ok((out, err, status))
}

fn broken_pipe() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe not available")
}

/// Runs one external command and returns its output.
///
/// # Errors
///
/// - `CommandNotFound` / `PermissionDenied`: the program could not be launched.
/// - `Timeout`: `request.timeout` elapsed; the child was killed.
/// - `OutputTooLarge`: combined output passed `request.max_output_bytes`.
/// - `Io`: reading the pipes or waiting on the child failed.
pub async fn execute(request: &CommandRequest) -> Result<CommandResult, ExecutionError> {
    let program = request.command.program_label().to_string();
    debug!("Executing {:?} (timeout {:?})", request.command, request.timeout);

    let mut child = build_command(request)
        .spawn()
        .map_err(|e| classify_spawn_error(&program, e))?;

    let outcome = tokio::time::timeout(
        request.timeout,
        run_to_completion(&mut child, request.max_output_bytes),
    )
    .await;

    let (out, err, status) = match outcome {
        Ok(Ok(done)) => done,
        Ok(Err(e)) => {
            if e.kind() == ErrorKind::OutputTooLarge {
                warn!(
                    "Output of '{}' exceeded {} bytes; killing it.",
                    program, request.max_output_bytes
                );
            }
            kill_tree(&mut child).await;
            return Err(e);
        }
        Err(_elapsed) => {
            warn!("'{}' timed out after {:?}; killing it.", program, request.timeout);
            kill_tree(&mut child).await;
            return Err(ExecutionError::Timeout {
                timeout: request.timeout,
            });
        }
    };

    let result = CommandResult {
        stdout: String::from_utf8_lossy(&out).into_owned(),
        stderr: String::from_utf8_lossy(&err).into_owned(),
        exit_succeeded: status.success(),
        exit_code: status.code(),
    };

    if matches!(request.command, CommandLine::Shell(_)) {
        if let Some(launch_err) = classify_shell_status(&program, result.exit_code, &result.stderr)
        {
            return Err(launch_err);
        }
    }
    debug!(
        "'{}' finished: success={}, code={:?}, {} bytes stdout, {} bytes stderr",
        program,
        result.exit_succeeded,
        result.exit_code,
        result.stdout.len(),
        result.stderr.len()
    );
    Ok(result)
}

/// Kills the child and everything in its process group, then reaps it.
async fn kill_tree(child: &mut Child) {
    if let Some(pid) = child.id() {
        kill_descendants(pid).await;
    }
    if let Err(e) = child.kill().await {
        debug!("Kill after failed run returned: {}", e);
    }
}

#[cfg(unix)]
async fn kill_descendants(pid: u32) {
    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        debug!("killpg({}) returned: {}", raw, e);
    }
}

#[cfg(windows)]
async fn kill_descendants(pid: u32) {
    let status = Command::new("taskkill")
        .args(["/F", "/T", "/PID", &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    if let Err(e) = status {
        debug!("taskkill /T for {} failed: {}", pid, e);
    }
}

#[cfg(not(any(unix, windows)))]
async fn kill_descendants(_pid: u32) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> ExecOptions {
        ExecOptions {
            timeout: Duration::from_secs(10),
            ..ExecOptions::default()
        }
    }

    #[test]
    fn test_options_build_requests() {
        let options = ExecOptions {
            working_directory: Some(PathBuf::from("/tmp")),
            ..ExecOptions::default()
        };
        let req = options.argv("kill", ["-9", "42"]);
        assert_eq!(
            req.command,
            CommandLine::Argv {
                program: "kill".into(),
                args: vec!["-9".into(), "42".into()]
            }
        );
        assert_eq!(req.working_directory, Some(PathBuf::from("/tmp")));
        assert_eq!(req.timeout, DEFAULT_TIMEOUT);
        assert_eq!(req.max_output_bytes, DEFAULT_MAX_OUTPUT_BYTES);
    }

    #[test]
    fn test_into_success() {
        let ok = CommandResult {
            stdout: "out".into(),
            stderr: String::new(),
            exit_succeeded: true,
            exit_code: Some(0),
        };
        assert!(ok.clone().into_success().is_ok());

        let failed = CommandResult {
            exit_succeeded: false,
            exit_code: Some(1),
            stderr: "no such process".into(),
            ..ok
        };
        let err = failed.into_success().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandFailed);
        assert_eq!(err.to_string(), "no such process");
    }

    #[tokio::test]
    async fn test_missing_program_is_command_not_found() {
        let err = execute(&opts().argv("cmdrs-no-such-program-12345", Vec::<String>::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandNotFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_captures_stdout_and_stderr() {
        let result = execute(&opts().shell("echo hello; echo oops >&2"))
            .await
            .unwrap();
        assert!(result.exit_succeeded);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "oops\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_not_an_error() {
        let result = execute(&opts().shell("echo failing >&2; exit 3"))
            .await
            .unwrap();
        assert!(!result.exit_succeeded);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stderr, "failing\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_missing_command_is_classified() {
        let err = execute(&opts().shell("cmdrs-no-such-program-12345 --flag"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandNotFound);
        assert!(err.to_string().contains("cmdrs-no-such-program-12345"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_argv_passes_arguments_unshelled() {
        let result = execute(&opts().argv("printf", ["%s|", "a b", "$HOME", "c;d"]))
            .await
            .unwrap();
        assert_eq!(result.stdout, "a b|$HOME|c;d|");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_utf8_output_is_decoded() {
        let result = execute(&opts().argv("printf", ["%s", "naïve 日本"]))
            .await
            .unwrap();
        assert_eq!(result.stdout, "naïve 日本");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_yields_error_not_partial_result() {
        let request = ExecOptions {
            timeout: Duration::from_millis(200),
            ..ExecOptions::default()
        }
        .shell("echo partial; sleep 5");
        let started = std::time::Instant::now();
        let err = execute(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_argv_timeout() {
        let request = ExecOptions {
            timeout: Duration::from_millis(100),
            ..ExecOptions::default()
        }
        .argv("sleep", ["5"]);
        let err = execute(&request).await.unwrap_err();
        assert!(matches!(err, ExecutionError::Timeout { timeout } if timeout == Duration::from_millis(100)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_limit_enforced() {
        let request = ExecOptions {
            max_output_bytes: 1024,
            ..opts()
        }
        .shell("yes cmdrs");
        let err = execute(&request).await.unwrap_err();
        assert!(matches!(err, ExecutionError::OutputTooLarge { limit: 1024 }));
    }

    #[cfg(unix)]
    fn non_executable_script(dir: &std::path::Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("script.sh");
        std::fs::write(&path, "#!/bin/sh\necho ran\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_argv_non_executable_is_permission_denied() {
        let dir = tempfile::tempdir().unwrap();
        let script = non_executable_script(dir.path());
        let err = execute(&opts().argv(script.to_string_lossy(), Vec::<String>::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_non_executable_is_permission_denied() {
        let dir = tempfile::tempdir().unwrap();
        let script = non_executable_script(dir.path());
        let err = execute(&opts().shell(script.to_string_lossy()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_plain_exit_127_is_not_a_launch_failure() {
        let result = execute(&opts().shell("exit 127")).await.unwrap();
        assert!(!result.exit_succeeded);
        assert_eq!(result.exit_code, Some(127));

        let result = execute(&opts().shell("echo denied >&2; exit 126")).await.unwrap();
        assert_eq!(result.exit_code, Some(126));
    }

    #[test]
    fn test_classify_shell_status_needs_diagnostic() {
        let not_found = classify_shell_status("foo", Some(127), "sh: 1: foo: not found\n");
        let plain = classify_shell_status("exit", Some(127), "");
        let other = classify_shell_status("foo", Some(1), "foo: not found");
        if cfg!(windows) {
            assert!(not_found.is_none());
        } else {
            assert!(matches!(not_found, Some(ExecutionError::CommandNotFound { .. })));
        }
        assert!(plain.is_none());
        assert!(other.is_none());
    }

    /// Whether `pid` is still a live (non-zombie) process.
    #[cfg(unix)]
    fn is_alive(pid: i32) -> bool {
        if nix::sys::signal::kill(Pid::from_raw(pid), None).is_err() {
            return false;
        }
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Ok(stat) => !stat
                .rsplit(')')
                .next()
                .map(|rest| rest.trim_start().starts_with('Z'))
                .unwrap_or(false),
            Err(_) => !cfg!(target_os = "linux"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_shell_descendants() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("sleeper.pid");
        let request = ExecOptions {
            timeout: Duration::from_millis(300),
            ..ExecOptions::default()
        }
        .shell(format!(
            "sleep 30 & echo $! > '{}'; sleep 30; true",
            pid_file.display()
        ));

        let err = execute(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);

        let pid: i32 = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        let mut alive = true;
        for _ in 0..40 {
            alive = is_alive(pid);
            if !alive {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(!alive, "background sleep {} survived the timeout", pid);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_working_directory_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        let request = ExecOptions {
            working_directory: Some(canonical.clone()),
            ..opts()
        }
        .argv("pwd", ["-P"]);
        let result = execute(&request).await.unwrap();
        assert_eq!(result.stdout.trim_end(), canonical.to_string_lossy());
    }
}
