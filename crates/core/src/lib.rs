//! Sidekick Core Library
//!
//! Shared plumbing for the sidekick toolkit, a set of companion
//! utilities for an external script-management tool (the "host
//! runner"). The host runner owns script storage, tags, history and
//! execution; this crate only talks to it.
//!
//! # Modules
//!
//! - [`runner`]: builds and executes host-runner command lines, and
//!   reads the environment the runner exports to its scripts
//! - [`dump_args`]: models for the runner's `--dump-args` JSON output
//! - [`listing`]: parsers for the runner's plain-text output formats
//! - [`shell`]: commandline injection into the user's shell
//! - [`error`]: the shared error type

pub mod dump_args;
pub mod error;
pub mod listing;
pub mod runner;
pub mod shell;
