//! Adapter around the host runner executable.
//!
//! Every utility in this workspace drives the host runner as a
//! subprocess. This module builds the command line (home directory,
//! visibility flags, per-utility prefix arguments), captures output and
//! maps nonzero exits to [`Error::SubProcessExit`].

use std::convert::Infallible;
use std::env;
use std::process::{Command, Stdio};

use log::debug;

use crate::dump_args::DumpedArgs;
use crate::error::{Error, Result};

/// Environment variables the host runner exports to its scripts.
#[derive(Clone, Copy, Debug)]
pub enum EnvVar {
    /// Name of the script the runner invoked.
    Name,
    /// Command line the user typed to reach the runner.
    Cmd,
    /// Run id of the current invocation.
    RunId,
    /// Editor the runner was configured with.
    Editor,
    /// File the enclosing shell integration sources after we exit.
    Source,
    /// The script home directory.
    Home,
    /// Path of the runner executable itself.
    Exe,
}

impl EnvVar {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            EnvVar::Name => "NAME",
            EnvVar::Cmd => "SK_CMD",
            EnvVar::RunId => "SK_RUN_ID",
            EnvVar::Editor => "SK_EDITOR",
            EnvVar::Source => "SK_SOURCE",
            EnvVar::Home => "SK_HOME",
            EnvVar::Exe => "SK_EXE",
        }
    }

    /// Reads the variable, failing if the runner did not set it.
    pub fn get(self) -> Result<String> {
        env::var(self.key()).map_err(|_| Error::MissingEnv(self.key()))
    }
}

pub struct HostRunner {
    exe: String,
    home: String,
    prefix: Vec<String>,
}

impl HostRunner {
    /// Adapter for the home directory this process was launched from.
    pub fn from_env() -> Result<Self> {
        let home = EnvVar::Home.get()?;
        Self::with_home(home)
    }

    /// Adapter for another home directory (e.g. an import source).
    pub fn with_home(home: impl Into<String>) -> Result<Self> {
        Ok(Self {
            exe: EnvVar::Exe.get()?,
            home: home.into(),
            prefix: Vec::new(),
        })
    }

    #[must_use]
    pub fn home(&self) -> &str {
        &self.home
    }

    /// Arguments inserted before every subcommand, e.g.
    /// `--skip-script <name>` so a utility stays out of the history it
    /// is browsing.
    pub fn set_prefix(&mut self, prefix: Vec<String>) {
        self.prefix = prefix;
    }

    fn command(&self, args: &[&str], all_visibility: bool) -> Command {
        let mut cmd = Command::new(&self.exe);
        cmd.arg("--no-alias").arg("-H").arg(&self.home);
        if all_visibility {
            cmd.args(["-s", "all", "--timeless"]);
        }
        cmd.args(&self.prefix);
        cmd.args(args);
        cmd
    }

    /// Run and capture stdout; stderr goes through to the user.
    pub fn output(&self, args: &[&str], all_visibility: bool) -> Result<String> {
        self.run_captured(args, all_visibility, Stdio::inherit(), &[])
    }

    /// Like [`Self::output`], but with extra environment variables.
    pub fn output_with_env(
        &self,
        args: &[&str],
        all_visibility: bool,
        envs: &[(String, String)],
    ) -> Result<String> {
        self.run_captured(args, all_visibility, Stdio::inherit(), envs)
    }

    /// Capture stdout and silence stderr, for existence probes such as
    /// `which` where a failure is an expected answer.
    pub fn output_quiet(&self, args: &[&str], all_visibility: bool) -> Result<String> {
        self.run_captured(args, all_visibility, Stdio::null(), &[])
    }

    fn run_captured(
        &self,
        args: &[&str],
        all_visibility: bool,
        stderr: Stdio,
        envs: &[(String, String)],
    ) -> Result<String> {
        let mut cmd = self.command(args, all_visibility);
        cmd.envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        debug!("running host runner: {:?}", cmd);
        let output = cmd.stderr(stderr).output()?;
        if !output.status.success() {
            return Err(Error::SubProcessExit(output.status.code().unwrap_or(-1)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run with all stdio inherited, for interactive subcommands.
    pub fn status(&self, args: &[&str], all_visibility: bool) -> Result<()> {
        let mut cmd = self.command(args, all_visibility);
        debug!("running host runner interactively: {:?}", cmd);
        let status = cmd.spawn()?.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::SubProcessExit(status.code().unwrap_or(-1)))
        }
    }

    /// Hand the terminal over to the host runner and exit this process
    /// with the runner's exit code.
    pub fn hand_off(&self, args: &[&str]) -> Result<Infallible> {
        let mut cmd = self.command(args, false);
        debug!("handing off to host runner: {:?}", cmd);
        let status = cmd.spawn()?.wait()?;
        std::process::exit(status.code().unwrap_or(1));
    }

    /// Ask the runner to parse `args` and dump the result as JSON, so
    /// utilities never re-implement its argument grammar.
    pub fn dump_args(&self, args: &[&str]) -> Result<DumpedArgs> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("--dump-args");
        full.extend_from_slice(args);
        let raw = self.output(&full, false)?;
        DumpedArgs::parse(&raw)
    }
}
