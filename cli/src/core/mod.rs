//! # cmdrs Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces shared by every other module:
//! - `config`: configuration loading, merging, and validation
//! - `error`: error types and the `Result` alias
//! - `templating`: the command template engine (tokenizing and placeholder
//!   substitution for user-defined command lines)
//!
pub mod config;
pub mod error;
pub mod templating;
