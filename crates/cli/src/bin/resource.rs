//! Locate the resource files of a script.
//!
//! Resources live under `<home>/.resource/<script-id>/`. With a script
//! query the matching scripts' resources are browsed interactively;
//! with no query the utility walks the parent processes against `top`
//! output to find the script that called it. Resource names after `--`
//! skip the selector and print the paths directly (creating the
//! directory), so scripts can pipe them.

use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, ExitCode};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use itertools::Itertools;

use sidekick_core::error::{Error, Result};
use sidekick_core::listing::{parse_id_name, parse_top, ScriptRef};
use sidekick_core::runner::{EnvVar, HostRunner};
use sidekick_core::shell;
use sidekick_cli::selection::{
    ColorTag, EmphasisRange, FormattedLine, Key, SelectOption, Selector,
};

/// Browse or print the resource files of a script.
#[derive(Parser, Debug)]
#[command(name = "sk-resource")]
struct Args {
    /// Script queries whose resources to browse. Empty means "the
    /// script that called this utility".
    queries: Vec<String>,

    /// Resource names; when given, paths are printed without a
    /// selector.
    #[arg(last = true)]
    resources: Vec<String>,
}

#[derive(Clone)]
struct ResourceOption {
    script_name: String,
    script_id: u64,
    resource: String,
    /// Column the script name is right-justified into, already adjusted
    /// for the width of this row's index number.
    pad: usize,
}

impl ResourceOption {
    fn path(&self, base: &str) -> String {
        format!("{}/{}", self.dir(base), self.resource)
    }

    fn dir(&self, base: &str) -> String {
        format!("{base}/{}", self.script_id)
    }
}

impl SelectOption for ResourceOption {
    fn format(&self) -> FormattedLine {
        let spaces = self.pad.saturating_sub(self.script_name.chars().count());
        let text = format!("{}{} {}", " ".repeat(spaces), self.script_name, self.resource);
        let emphasis = vec![EmphasisRange {
            start: spaces,
            end: spaces + self.script_name.len(),
            tag: ColorTag::White,
        }];
        FormattedLine { text, emphasis }
    }
}

fn scripts_from_query(runner: &HostRunner, queries: &[String]) -> Result<Vec<ScriptRef>> {
    let mut argv = vec![
        "ls",
        "--grouping=none",
        "--plain",
        "--format",
        "{{id}} {{name}}",
    ];
    argv.extend(queries.iter().map(String::as_str));
    Ok(parse_id_name(&runner.output(&argv, false)?))
}

fn parent_pid(pid: u32) -> Option<u32> {
    let out = Command::new("ps")
        .args(["-o", "ppid="])
        .arg(pid.to_string())
        .output()
        .ok()?;
    String::from_utf8_lossy(&out.stdout).trim().parse().ok()
}

/// Walks the parent processes looking for one the host runner reports
/// in `top`, then resolves its script name to an id.
fn find_calling_script(runner: &HostRunner) -> Result<Option<ScriptRef>> {
    let top = parse_top(&runner.output(&["top"], false)?);
    // start at the grandparent in case we were launched through the
    // runner's own wrapper
    let mut pid = parent_pid(std::process::id()).and_then(parent_pid);
    while let Some(p) = pid {
        if p == 0 {
            break;
        }
        if let Some(entry) = top.iter().find(|e| e.pid == p) {
            let query = format!("={}!", entry.script_name());
            let refs = scripts_from_query(runner, &[query])?;
            return Ok(refs.into_iter().next());
        }
        pid = parent_pid(p);
    }
    Ok(None)
}

fn load_resources(base: &str, scripts: &[ScriptRef]) -> Result<Vec<ResourceOption>> {
    let mut raw: Vec<(&ScriptRef, String)> = Vec::new();
    for script in scripts {
        let dir = PathBuf::from(base).join(script.id.to_string());
        if !dir.is_dir() {
            continue;
        }
        let mut entries: Vec<(SystemTime, String)> = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(UNIX_EPOCH);
            entries.push((modified, entry.file_name().to_string_lossy().into_owned()));
        }
        // newest first
        for (_, name) in entries.into_iter().sorted_by(|a, b| b.0.cmp(&a.0)) {
            raw.push((script, name));
        }
    }

    // align the resource column across rows with differently-wide index
    // numbers
    let width = raw
        .iter()
        .enumerate()
        .map(|(i, (script, _))| script.name.chars().count() + (i + 1).to_string().len())
        .max()
        .unwrap_or(0);

    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(i, (script, resource))| ResourceOption {
            script_name: script.name.clone(),
            script_id: script.id,
            resource,
            pad: width - (i + 1).to_string().len(),
        })
        .collect())
}

fn execute() -> Result<()> {
    let args = Args::parse();
    let runner = HostRunner::from_env()?;
    let base = format!("{}/.resource", runner.home());

    let scripts = if args.queries.is_empty() {
        match find_calling_script(&runner)? {
            Some(script) => vec![script],
            None => {
                eprintln!("Can't find the calling script; listing resources of every script");
                scripts_from_query(&runner, &[])?
            }
        }
    } else {
        scripts_from_query(&runner, &args.queries)?
    };
    if scripts.is_empty() {
        return Err(Error::Misc("no matching script".to_string()));
    }

    if !args.resources.is_empty() {
        if scripts.len() != 1 {
            return Err(Error::Misc(format!(
                "expected exactly one script, got {}",
                scripts.len()
            )));
        }
        let dir = format!("{base}/{}", scripts[0].id);
        fs::create_dir_all(&dir)?;
        for name in &args.resources {
            println!("{dir}/{name}");
        }
        return Ok(());
    }

    let mut selector = Selector::new();
    selector.load(load_resources(&base, &scripts)?);

    let edit = Rc::new(Cell::new(false));
    {
        let edit = Rc::clone(&edit);
        selector.register_keys_virtual(
            &[Key::Char('e'), Key::Char('E')],
            Box::new(move |_, _| {
                edit.set(true);
                Ok(())
            }),
            "edit the resource files",
            false,
        );
    }
    selector.register_keys_virtual(
        &[Key::Char('p'), Key::Char('P')],
        Box::new(|_, _| Ok(())),
        "print the resource file paths",
        false,
    );
    selector.register_keys_virtual(
        &[Key::Enter],
        Box::new(|_, _| Ok(())),
        "do nothing",
        true,
    );

    let picked = match selector.run() {
        Ok(result) => result.into_options(),
        Err(Error::Empty) => {
            eprintln!("No existing resource");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if edit.get() {
        let editor = shell::split_args(&EnvVar::Editor.get()?)?;
        let Some((program, editor_args)) = editor.split_first() else {
            return Err(Error::Misc("empty editor command".to_string()));
        };
        let status = Command::new(program)
            .args(editor_args)
            .args(picked.iter().map(|opt| opt.path(&base)))
            .status()?;
        std::process::exit(status.code().unwrap_or(1));
    }

    for opt in &picked {
        fs::create_dir_all(opt.dir(&base))?;
        println!("{}", opt.path(&base));
    }
    Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_option_right_justifies_the_name() {
        let opt = ResourceOption {
            script_name: "db".to_string(),
            script_id: 3,
            resource: "dump.sql".to_string(),
            pad: 6,
        };
        let line = opt.format();
        assert_eq!(line.text, "    db dump.sql");
        assert_eq!(line.emphasis.len(), 1);
        assert_eq!(line.emphasis[0].start, 4);
        assert_eq!(line.emphasis[0].end, 6);
        assert_eq!(line.emphasis[0].tag, ColorTag::White);
    }

    #[test]
    fn test_resource_paths() {
        let opt = ResourceOption {
            script_name: "db".to_string(),
            script_id: 3,
            resource: "dump.sql".to_string(),
            pad: 2,
        };
        assert_eq!(opt.dir("/home/.resource"), "/home/.resource/3");
        assert_eq!(opt.path("/home/.resource"), "/home/.resource/3/dump.sql");
    }
}
