//! Reconcile the script home directory with the store.
//!
//! Files on disk the host runner does not know about are registered;
//! store entries whose file is gone are purged.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::warn;

use sidekick_core::error::Result;
use sidekick_core::listing::{extract_name, should_collect};
use sidekick_core::runner::HostRunner;

/// Register untracked script files and purge entries without a file.
#[derive(Parser, Debug)]
#[command(name = "sk-collect")]
struct Args {}

fn directory_tree(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            directory_tree(root, &path, out)?;
        } else if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_string_lossy().into_owned());
        }
    }
    Ok(())
}

fn execute() -> Result<()> {
    Args::parse();
    let runner = HostRunner::from_env()?;
    let home = runner.home().to_string();
    let root = Path::new(&home);

    let mut files = Vec::new();
    directory_tree(root, root, &mut files)?;

    for rel in &files {
        if !should_collect(rel) {
            continue;
        }
        let (name, ext) = match extract_name(rel) {
            Ok(parts) => parts,
            Err(err) => {
                warn!("skipping `{rel}`: {err}");
                continue;
            }
        };
        let target = format!("={name}");
        if runner.output_quiet(&["which", &target], true).is_ok() {
            continue;
        }
        println!("collecting script {rel}!");
        runner.output(&["edit", &target, "-T", &ext, "--fast"], false)?;
    }

    let names = runner.output(&["ls", "--grouping=none", "--name", "--plain"], true)?;
    for name in names.split_whitespace() {
        let target = format!("={name}");
        let Ok(file) = runner.output_quiet(&["which", &target], true) else {
            continue;
        };
        let file = file.trim();
        if !Path::new(file).exists() {
            println!("removing script {file}!");
            runner.output(&["rm", "--purge", &target], true)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
