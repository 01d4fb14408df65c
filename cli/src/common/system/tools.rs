//! # cmdrs Tool Detection (`common::system::tools`)
//!
//! File: cli/src/common/system/tools.rs
//!
//! ## Overview
//!
//! A yes/no check for whether an external tool can be found, and the basic
//! metacharacter stripping applied to names that end up inside a shell line.
//! Discovery beyond "is it on the PATH" (versions, install locations) is out
//! of scope.
//!
use crate::common::process::exec::{self, ExecOptions};
use crate::common::system::host::{HostEnvironment, Platform};
use std::time::Duration;
use tracing::debug;

/// Characters with meaning to `sh` or `cmd.exe` that never belong in a tool
/// or process name.
const SHELL_METACHARACTERS: &[char] = &[
    ';', '&', '|', '$', '`', '<', '>', '(', ')', '{', '}', '"', '\'', '\\', '!', '^', '%', '\n',
    '\r',
];

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Removes shell metacharacters and surrounding whitespace from `input`.
///
/// This is basic stripping, not escaping: `a;b` becomes `ab`.
pub fn strip_shell_metacharacters(input: &str) -> String {
    input
        .chars()
        .filter(|c| !SHELL_METACHARACTERS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Returns `true` if `name` resolves to an executable on this host.
///
/// Any failure (including the check itself failing to run) counts as
/// "not available".
pub async fn is_tool_available(host: &HostEnvironment, name: &str) -> bool {
    let name = strip_shell_metacharacters(name);
    if name.is_empty() || name.contains(char::is_whitespace) {
        return false;
    }
    let line = match host.platform {
        Platform::Windows => format!("where {}", name),
        Platform::Unix => format!("command -v {}", name),
    };
    let options = ExecOptions {
        timeout: CHECK_TIMEOUT,
        ..ExecOptions::default()
    };
    let available = match exec::execute(&options.shell(line)).await {
        Ok(result) => result.exit_succeeded,
        Err(e) => {
            debug!("Availability check for '{}' failed: {}", name, e);
            false
        }
    };
    debug!("Tool '{}' available: {}", name, available);
    available
}
