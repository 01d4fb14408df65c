//! # cmdrs System Utilities Module (`common::system`)
//!
//! File: cli/src/common/system/mod.rs
//!
//! ## Overview
//!
//! Interaction with the host system outside of running a specific command:
//!
//! - **`host`**: the `HostEnvironment` (home directory, platform) resolved once
//!   by the host and passed into the rest of cmdrs.
//! - **`tools`**: yes/no availability checks for external tools, and the
//!   metacharacter stripping used on names placed in shell lines.
//!

/// Host-resolved environment values (home directory, platform).
pub mod host;
/// Tool availability check and shell metacharacter stripping.
pub mod tools;
