//! # cmdrs Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges, and validates the cmdrs configuration. The
//! configuration carries executor defaults (timeout, output limit, working
//! directory), overrides for the process-control commands, the user's named
//! command templates, and bulk-run settings.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.cmdrs.toml` in the start directory or its ancestors
//!    (the search stops at a directory containing `.git`)
//! 2. User-specific `<config_dir>/cmdrs/config.toml`
//! 3. Default values defined in the code
//!
//! Paths are expanded against the `HostEnvironment` supplied by the caller;
//! nothing here reads the process environment directly apart from locating
//! the user config directory.
//!
//! ## Examples
//!
//! ```toml
//! [executor]
//! timeout_secs = 10
//! working_directory = "~/scratch"
//!
//! [process]
//! kill_by_name = "pkill -x {name}"
//!
//! [templates]
//! edit = "notepad.exe \"%s\""
//!
//! [bulk]
//! concurrency = 4
//! ```
//!
use crate::common::process::exec::ExecOptions;
use crate::common::system::host::HostEnvironment;
use crate::core::error::{CmdrsError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Placeholder substituted with a process identifier in `process.kill_by_id`.
pub const PID_PLACEHOLDER: &str = "{pid}";
/// Placeholder substituted with a process name in `process.kill_by_name`.
pub const NAME_PLACEHOLDER: &str = "{name}";

const PROJECT_CONFIG_FILENAME: &str = ".cmdrs.toml";

/// The resolved configuration every component reads.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Config {
    pub executor: ExecutorConfig,
    pub process: ProcessConfig,
    /// Named command templates, e.g. `edit = "notepad.exe \"%s\""`.
    pub templates: BTreeMap<String, String>,
    pub bulk: BulkConfig,
}

/// Defaults applied to every command the executor runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorConfig {
    pub timeout_secs: u64,
    pub max_output_bytes: usize,
    /// Working directory for spawned commands (can use ~). Expanded on load.
    pub working_directory: Option<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            working_directory: None,
        }
    }
}

/// Overrides for the process-control commands. Unset fields fall back to
/// the platform defaults in `common::process::inventory`.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProcessConfig {
    /// Shell command line producing headerless quoted-CSV process rows.
    pub list_command: Option<String>,
    /// Command template containing `{pid}`.
    pub kill_by_id: Option<String>,
    /// Command template containing `{name}`.
    pub kill_by_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkConfig {
    /// Number of items processed at once. `1` is strictly sequential.
    pub concurrency: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        BulkConfig {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;
const DEFAULT_CONCURRENCY: usize = 1;

/// One configuration file as written. Every setting is optional so that a
/// value set explicitly in a file can be told apart from one left unset.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub executor: ExecutorFile,
    #[serde(default)]
    pub process: ProcessConfig,
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
    #[serde(default)]
    pub bulk: BulkFile,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExecutorFile {
    pub timeout_secs: Option<u64>,
    pub max_output_bytes: Option<usize>,
    pub working_directory: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BulkFile {
    pub concurrency: Option<usize>,
}

impl ConfigFile {
    /// Layers `over` on top of `self`: every setting `over` sets wins.
    /// Templates merge per name.
    pub fn layered_with(self, over: ConfigFile) -> ConfigFile {
        let mut templates = self.templates;
        templates.extend(over.templates);
        ConfigFile {
            executor: ExecutorFile {
                timeout_secs: over.executor.timeout_secs.or(self.executor.timeout_secs),
                max_output_bytes: over
                    .executor
                    .max_output_bytes
                    .or(self.executor.max_output_bytes),
                working_directory: over
                    .executor
                    .working_directory
                    .or(self.executor.working_directory),
            },
            process: ProcessConfig {
                list_command: over.process.list_command.or(self.process.list_command),
                kill_by_id: over.process.kill_by_id.or(self.process.kill_by_id),
                kill_by_name: over.process.kill_by_name.or(self.process.kill_by_name),
            },
            templates,
            bulk: BulkFile {
                concurrency: over.bulk.concurrency.or(self.bulk.concurrency),
            },
        }
    }

    /// Fills whatever no file set with the built-in defaults.
    pub fn resolve(self) -> Config {
        Config {
            executor: ExecutorConfig {
                timeout_secs: self.executor.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
                max_output_bytes: self
                    .executor
                    .max_output_bytes
                    .unwrap_or(DEFAULT_MAX_OUTPUT_BYTES),
                working_directory: self.executor.working_directory,
            },
            process: self.process,
            templates: self.templates,
            bulk: BulkConfig {
                concurrency: self.bulk.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            },
        }
    }
}

impl Config {
    /// Executor settings derived from this configuration.
    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            timeout: Duration::from_secs(self.executor.timeout_secs),
            max_output_bytes: self.executor.max_output_bytes,
            working_directory: self.executor.working_directory.as_ref().map(PathBuf::from),
        }
    }
}

/// Loads user and project configuration, searching for the project file from
/// the current directory.
pub fn load_config(host: &HostEnvironment) -> Result<Config> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let user_config = load_user_config()?;
    load_config_with(host, user_config, &current_dir)
}

/// Layers the project config found from `start_dir` over an already-loaded
/// user config, then applies defaults, expands paths and validates.
pub fn load_config_with(
    host: &HostEnvironment,
    user_config: Option<ConfigFile>,
    start_dir: &Path,
) -> Result<Config> {
    let project_config = load_project_config(start_dir)?;
    let layered = user_config
        .unwrap_or_default()
        .layered_with(project_config.unwrap_or_default());
    let mut merged_config = layered.resolve();
    expand_config_paths(&mut merged_config, host);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<ConfigFile>> {
    let Some(proj_dirs) = ProjectDirs::from("com", "cmdrs", "cmdrs") else {
        debug!("Could not determine user config directory.");
        return Ok(None);
    };
    let config_path = proj_dirs.config_dir().join("config.toml");
    if config_path.is_file() {
        info!("Loading user configuration from: {}", config_path.display());
        load_config_from_path(&config_path).map(Some)
    } else {
        debug!(
            "User configuration file not found at {}",
            config_path.display()
        );
        Ok(None)
    }
}

fn load_project_config(start_dir: &Path) -> Result<Option<ConfigFile>> {
    match find_project_config_path(start_dir) {
        Some(path) => {
            info!("Loading project configuration from: {}", path.display());
            load_config_from_path(&path).map(Some)
        }
        None => {
            debug!("No project configuration file (.cmdrs.toml) found.");
            Ok(None)
        }
    }
}

fn find_project_config_path(start_dir: &Path) -> Option<PathBuf> {
    let mut path = start_dir;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn expand_config_paths(config: &mut Config, host: &HostEnvironment) {
    if let Some(dir) = config.executor.working_directory.as_mut() {
        *dir = host.expand_path(dir);
        debug!("Expanded working directory: {}", dir);
    }
}

/// Rejects zero limits and process templates missing their placeholder.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.executor.timeout_secs == 0 {
        return Err(anyhow!(CmdrsError::Config(
            "executor.timeout_secs must be greater than zero.".to_string()
        )));
    }
    if config.executor.max_output_bytes == 0 {
        return Err(anyhow!(CmdrsError::Config(
            "executor.max_output_bytes must be greater than zero.".to_string()
        )));
    }
    if config.bulk.concurrency == 0 {
        return Err(anyhow!(CmdrsError::Config(
            "bulk.concurrency must be at least 1.".to_string()
        )));
    }
    if let Some(line) = &config.process.list_command {
        if line.trim().is_empty() {
            return Err(anyhow!(CmdrsError::Config(
                "process.list_command cannot be empty.".to_string()
            )));
        }
    }
    check_placeholder("process.kill_by_id", &config.process.kill_by_id, PID_PLACEHOLDER)?;
    check_placeholder(
        "process.kill_by_name",
        &config.process.kill_by_name,
        NAME_PLACEHOLDER,
    )?;
    for (name, template) in &config.templates {
        if template.trim().is_empty() {
            return Err(anyhow!(CmdrsError::Config(format!(
                "Template '{}' cannot be empty.",
                name
            ))));
        }
    }
    Ok(())
}

fn check_placeholder(field: &str, template: &Option<String>, placeholder: &str) -> Result<()> {
    match template {
        Some(t) if !t.contains(placeholder) => Err(anyhow!(CmdrsError::Config(format!(
            "{} must contain the '{}' placeholder (got '{}').",
            field, placeholder, t
        )))),
        _ => Ok(()),
    }
}
