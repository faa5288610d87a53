//! Interactively browse and re-run the invocation history of a script.
//!
//! The target script and paging options are parsed by the host runner
//! itself through `--dump-args`, so this binary accepts the exact
//! grammar of `history show`.

use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use log::warn;

use sidekick_core::error::{Error, Result};
use sidekick_core::runner::{EnvVar, HostRunner};
use sidekick_core::shell;
use sidekick_cli::selection::{Key, Selector};

/// Browse the history of a script and run, delete or reuse entries.
#[derive(Parser, Debug)]
#[command(name = "sk-historian")]
struct Args {
    /// Arguments forwarded to the host runner's `history show` grammar:
    /// a script query plus options such as `--limit` and `--offset`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn load_history(
    runner: &HostRunner,
    script: &str,
    limit: u32,
    offset: u32,
) -> Result<Vec<String>> {
    let target = format!("={script}!");
    let limit = limit.to_string();
    let offset = offset.to_string();
    let raw = runner.output(
        &["history", "show", &target, "--limit", &limit, "--offset", &offset],
        false,
    )?;
    Ok(raw.lines().map(|line| line.trim().to_string()).collect())
}

fn execute() -> Result<()> {
    let args = Args::parse();
    let mut runner = HostRunner::from_env()?;

    // keep this browser out of the history it is browsing
    let self_name = EnvVar::Name.get()?;
    runner.set_prefix(vec!["--skip-script".to_string(), self_name]);
    let runner = Rc::new(runner);

    let mut dump_argv = vec!["history", "show"];
    dump_argv.extend(args.args.iter().map(String::as_str));
    let dumped = runner.dump_args(&dump_argv)?;
    let show = &dumped.subcmd.history.subcmd.show;
    let (offset, limit) = (show.offset, show.limit);

    // resolve the query to a concrete script name
    let mut ls_argv: Vec<String> = Vec::new();
    match dumped.recent {
        Some(recent) => {
            ls_argv.push("--recent".to_string());
            ls_argv.push(recent.to_string());
        }
        None if dumped.timeless => ls_argv.push("--timeless".to_string()),
        None => {}
    }
    for filter in &dumped.filter {
        ls_argv.push("--filter".to_string());
        ls_argv.push(filter.clone());
    }
    ls_argv.extend(
        ["ls", show.script.as_str(), "--grouping", "none", "--plain", "--name"]
            .iter()
            .map(ToString::to_string),
    );
    let refs: Vec<&str> = ls_argv.iter().map(String::as_str).collect();
    let script_name = runner.output(&refs, false)?.trim().to_string();

    eprintln!("Historian for {script_name}");

    let display_offset = offset as usize + 1;
    let mut selector = Selector::with_offset(display_offset);
    selector.load(load_history(&runner, &script_name, limit, offset)?);

    let sourcing = Rc::new(std::cell::Cell::new(false));

    {
        let runner = Rc::clone(&runner);
        let script = script_name.clone();
        selector.register_keys(
            &[Key::Char('d'), Key::Char('D')],
            Box::new(move |state, pos| {
                let target = format!("={script}!");
                let entry = (pos + display_offset).to_string();
                runner.output(&["history", "rm", &target, &entry], false)?;
                state.load(load_history(&runner, &script, limit, offset)?);
                Ok(())
            }),
            "delete the history entry",
            true,
        );
    }
    {
        let sourcing = Rc::clone(&sourcing);
        selector.register_keys(
            &[Key::Char('c'), Key::Char('C')],
            Box::new(move |_, _| {
                sourcing.set(true);
                Ok(())
            }),
            "put the command on the next commandline",
            false,
        );
    }
    {
        let runner = Rc::clone(&runner);
        let script = script_name.clone();
        let sourcing = Rc::clone(&sourcing);
        selector.register_keys(
            &[Key::Char('r'), Key::Char('R')],
            Box::new(move |_, pos| {
                sourcing.set(true);
                let target = format!("={script}!");
                let entry = (pos + display_offset).to_string();
                runner.output(&["history", "rm", &target, &entry], false)?;
                Ok(())
            }),
            "replace the arguments",
            false,
        );
    }

    let picked = selector.run()?.into_options().into_iter().next();
    let args_line = picked.unwrap_or_default();

    let target = format!("={script_name}!");
    if sourcing.get() {
        let cmd = format!("{} {target} {args_line}", EnvVar::Cmd.get()?);
        match shell::inject_commandline(&cmd) {
            Err(Error::UnsupportedShell(name)) => {
                warn!("shell `{name}` does not support commandline injection");
            }
            other => other?,
        }
        Ok(())
    } else {
        eprintln!("{target} {args_line}");
        let mut run_argv = vec![target];
        run_argv.extend(shell::split_args(&args_line)?);
        let refs: Vec<&str> = run_argv.iter().map(String::as_str).collect();
        match runner.hand_off(&refs)? {}
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
