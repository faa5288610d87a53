//! Commandline injection.
//!
//! The host runner's shell integration sources the file named by the
//! `SK_SOURCE` environment variable after a utility exits; writing a
//! shell-specific snippet there puts a generated command line onto the
//! user's next prompt.

use std::env;
use std::fs;

use crate::error::{Error, Result};
use crate::runner::EnvVar;

/// Basename of the user's shell, empty when `$SHELL` is unset.
#[must_use]
pub fn shell_name() -> String {
    let shell = env::var("SHELL").unwrap_or_default();
    shell.rsplit('/').next().unwrap_or("").to_string()
}

/// Writes `cmd` into the source file so it appears on the next prompt.
///
/// # Errors
///
/// Fails with [`Error::UnsupportedShell`] when the user's shell has no
/// known injection snippet; callers usually log that and move on.
pub fn inject_commandline(cmd: &str) -> Result<()> {
    let quoted = shell_words::quote(cmd);
    let snippet = match shell_name().as_str() {
        "fish" => format!("commandline {quoted}"),
        "zsh" => format!("print -z {quoted}"),
        shell => return Err(Error::UnsupportedShell(shell.to_string())),
    };
    let path = EnvVar::Source.get()?;
    fs::write(&path, snippet)
        .map_err(|e| Error::io_error("commandline source".to_string(), path, e))
}

/// Splits a recorded argument string back into argv form, honoring
/// shell quoting.
pub fn split_args(raw: &str) -> Result<Vec<String>> {
    shell_words::split(raw).map_err(|e| Error::Misc(format!("bad argument string `{raw}`: {e}")))
}
