//! # cmdrs Host Environment (`common::system::host`)
//!
//! File: cli/src/common/system/host.rs
//!
//! ## Overview
//!
//! Everything cmdrs would otherwise read from the ambient process environment
//! (home directory, which platform's shell and tools to use) is gathered here,
//! once, by the host. The resulting `HostEnvironment` is passed down into
//! configuration expansion and process control so core logic can be exercised
//! with synthetic values in tests.
//!
use std::path::PathBuf;
use tracing::debug;

/// Which family of shell and system tools commands are built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `cmd.exe`, `tasklist`, `taskkill`, `where`.
    Windows,
    /// `sh`, `ps`, `kill`, `pkill`, `command -v`.
    Unix,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// Host-resolved environment values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    /// User home directory, used for `~` expansion. `None` leaves `~` as-is.
    pub home_dir: Option<PathBuf>,
    pub platform: Platform,
}

impl HostEnvironment {
    /// Resolves the environment of the running process. Only the host adapter
    /// calls this; library code receives the result.
    pub fn detect() -> Self {
        let env = HostEnvironment {
            home_dir: dirs::home_dir(),
            platform: Platform::current(),
        };
        debug!("Detected host environment: {:?}", env);
        env
    }

    /// Expands a leading `~` against `home_dir`.
    pub fn expand_path(&self, path: &str) -> String {
        shellexpand::tilde_with_context(path, || {
            self.home_dir
                .as_ref()
                .map(|home| home.to_string_lossy().into_owned())
        })
        .into_owned()
    }
}
