//! Interactively manage the host runner's running processes.
//!
//! Lists `top` output with this invocation filtered out, and lets the
//! user inspect process trees or wait on a (range) selection, either
//! directly, on the next commandline, or from a generated follow-up
//! script.

use std::cell::Cell;
use std::process::{Command, ExitCode};
use std::rc::Rc;

use clap::Parser;
use itertools::Itertools;
use log::warn;

use sidekick_core::error::{Error, Result};
use sidekick_core::listing::{parse_top, ProcessEntry};
use sidekick_core::runner::{EnvVar, HostRunner};
use sidekick_core::shell;
use sidekick_cli::selection::{FormattedLine, Key, SelectOption, Selector};

// script names hidden from the process list
const IGNORE_LIST: &[&str] = &["util/top"];

/// Browse running processes and wait on a selection of them.
#[derive(Parser, Debug)]
#[command(name = "sk-top")]
struct Args {
    /// Script queries forwarded to the host runner's `top` subcommand.
    #[arg(trailing_var_arg = true)]
    queries: Vec<String>,
}

#[derive(Clone)]
struct ProcessOption(ProcessEntry);

impl SelectOption for ProcessOption {
    fn format(&self) -> FormattedLine {
        FormattedLine::plain(format!("{} {}", self.0.pid, self.0.msg))
    }
}

#[derive(Clone, Copy)]
enum Action {
    Wait,
    Source,
    Create,
}

fn should_ignore(msg: &str) -> bool {
    IGNORE_LIST.iter().any(|name| {
        msg.strip_prefix(name)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}

fn execute() -> Result<()> {
    let args = Args::parse();
    let runner = HostRunner::from_env()?;
    let self_run_id: u64 = EnvVar::RunId
        .get()?
        .parse()
        .map_err(|_| Error::Misc("malformed run id".to_string()))?;

    let mut top_argv = vec!["top"];
    top_argv.extend(args.queries.iter().map(String::as_str));
    let raw = runner.output(&top_argv, false)?;

    let options: Vec<ProcessOption> = parse_top(&raw)
        .into_iter()
        .filter(|entry| entry.run_id != self_run_id && !should_ignore(&entry.msg))
        .map(ProcessOption)
        .collect();

    let mut selector = Selector::new();
    selector.load(options);

    let action = Rc::new(Cell::new(None::<Action>));

    selector.register_keys(
        &[Key::Char('p'), Key::Char('P')],
        Box::new(|state, pos| {
            let pid = state.options()[pos].0.pid.to_string();
            if let Err(err) = Command::new("pstree").arg("-plsT").arg(&pid).status() {
                warn!("pstree failed: {err}");
            }
            Ok(())
        }),
        "print the ps tree",
        true,
    );
    selector.register_keys_virtual(
        &[Key::Enter],
        Box::new(|_, _| Ok(())),
        "do nothing",
        true,
    );
    for (keys, picked, msg) in [
        (
            [Key::Char('a'), Key::Char('A')],
            Action::Create,
            "create a follow-up script waiting on the processes",
        ),
        (
            [Key::Char('w'), Key::Char('W')],
            Action::Wait,
            "wait for the processes to end",
        ),
        (
            [Key::Char('c'), Key::Char('C')],
            Action::Source,
            "wait for the processes, but on the next commandline",
        ),
    ] {
        let action = Rc::clone(&action);
        selector.register_keys_virtual(
            &keys,
            Box::new(move |_, _| {
                action.set(Some(picked));
                Ok(())
            }),
            msg,
            false,
        );
    }

    let targets = match selector.run() {
        Ok(result) => result.into_options(),
        Err(Error::Empty) => {
            eprintln!("No existing process");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let mut wait_argv = vec!["top".to_string(), "--wait".to_string()];
    for target in &targets {
        wait_argv.push("--id".to_string());
        wait_argv.push(target.0.run_id.to_string());
    }

    match action.get() {
        None => Ok(()),
        Some(Action::Wait) => {
            eprintln!("start waiting!");
            let refs: Vec<&str> = wait_argv.iter().map(String::as_str).collect();
            match runner.hand_off(&refs)? {}
        }
        Some(Action::Source) => {
            let cmd = format!(
                "{} --no-alias {} && ",
                EnvVar::Cmd.get()?,
                wait_argv.join(" ")
            );
            match shell::inject_commandline(&cmd) {
                Err(Error::UnsupportedShell(name)) => {
                    warn!("shell `{name}` does not support commandline injection");
                }
                other => other?,
            }
            Ok(())
        }
        Some(Action::Create) => {
            let msgs = targets.iter().map(|t| t.0.msg.as_str()).join(",");
            let content = format!(
                "# [SK_HELP]: created from top {msgs}\n\n{} --no-alias {}",
                EnvVar::Cmd.get()?,
                wait_argv.join(" ")
            );
            match runner.hand_off(&["edit", "--no-template", "-t", "+top", "--", &content])? {}
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_selection_end() => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
