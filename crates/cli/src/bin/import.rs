//! Import scripts from another home directory or a git repository.
//!
//! Git sources are cloned into a temporary directory first. Scripts
//! whose (optionally namespaced) name already exists locally are
//! skipped; the rest are transferred content-first through the host
//! runner, keeping their tags and types.

use std::fs;
use std::path::Path;
use std::process::{Command, ExitCode};

use clap::Parser;

use sidekick_core::error::{Error, Result};
use sidekick_core::listing::parse_grouped_ls;
use sidekick_core::runner::HostRunner;

/// Import scripts from another script home or a git repo.
#[derive(Parser, Debug)]
#[command(name = "sk-import")]
struct Args {
    /// Put every imported script under this namespace. Anonymous
    /// scripts (leading dot) keep their names.
    #[arg(short, long)]
    namespace: Option<String>,

    /// Source home directories or git repository addresses.
    #[arg(required = true)]
    sources: Vec<String>,
}

fn copy_recursively(src: &Path, dst: &Path) -> Result<()> {
    if src.is_dir() {
        fs::create_dir_all(dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_recursively(&entry.path(), &dst.join(entry.file_name()))?;
        }
    } else {
        fs::copy(src, dst)?;
    }
    Ok(())
}

fn copy_unless_exists(src_dir: &str, dst_dir: &str, target: &str) -> Result<()> {
    let src = Path::new(src_dir).join(target);
    let dst = Path::new(dst_dir).join(target);
    if src.exists() && !dst.exists() {
        copy_recursively(&src, &dst)?;
    }
    Ok(())
}

fn import_dir(runner: &HostRunner, dir: &str, namespace: Option<&str>) -> Result<()> {
    let other = HostRunner::with_home(dir)?;
    println!("import directory {dir}");

    let listing = other.output(&["ls", "--plain"], true)?;
    for script in parse_grouped_ls(&listing) {
        let new_name = match namespace {
            Some(ns) if !script.name.starts_with('.') => format!("{ns}/{}", script.name),
            _ => script.name.clone(),
        };
        let target = format!("={new_name}");

        if runner.output_quiet(&["which", &target], true).is_ok() {
            println!("{new_name} already exists!");
            continue;
        }

        println!("importing {} as {new_name}...", script.name);
        let source = format!("={}", script.name);
        let content = match other.output(&["cat", &source], true) {
            Ok(content) => content,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        let tags = script.tags.join(",");
        runner.output(
            &[
                "edit",
                &target,
                "-t",
                &tags,
                "-T",
                &script.ty,
                "--no-template",
                "--fast",
                "--",
                &content,
            ],
            false,
        )?;
    }

    // a whole-home import keeps the source's git state
    if namespace.is_none() {
        println!("Copying git directory...");
        copy_unless_exists(dir, runner.home(), ".git")?;
        println!("Copying gitignore...");
        copy_unless_exists(dir, runner.home(), ".gitignore")?;
    }
    Ok(())
}

fn import(runner: &HostRunner, source: &str, namespace: Option<&str>) -> Result<()> {
    let expanded = shellexpand::tilde(source).into_owned();
    if Path::new(&expanded).is_dir() {
        return import_dir(runner, &expanded, namespace);
    }

    let tmp = tempfile::tempdir()?;
    let clone_dir = tmp.path().join("repo");
    let status = Command::new("git")
        .arg("clone")
        .arg(&expanded)
        .arg(&clone_dir)
        .status()?;
    if !status.success() {
        return Err(Error::SubProcessExit(status.code().unwrap_or(-1)));
    }
    import_dir(runner, &clone_dir.to_string_lossy(), namespace)
}

fn execute() -> Result<()> {
    let args = Args::parse();
    let runner = HostRunner::from_env()?;
    if let Some(ns) = &args.namespace {
        eprintln!("import with namespace {ns}");
    }
    for source in &args.sources {
        import(&runner, source, args.namespace.as_deref())?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_unless_exists() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        let git_dir = src.path().join(".git");
        fs::create_dir_all(git_dir.join("refs")).unwrap();
        fs::write(git_dir.join("config"), "[core]").unwrap();
        fs::write(git_dir.join("refs").join("HEAD"), "ref").unwrap();

        let src_str = src.path().to_string_lossy().into_owned();
        let dst_str = dst.path().to_string_lossy().into_owned();
        copy_unless_exists(&src_str, &dst_str, ".git").unwrap();
        assert_eq!(
            fs::read_to_string(dst.path().join(".git/config")).unwrap(),
            "[core]"
        );
        assert!(dst.path().join(".git/refs/HEAD").exists());

        // a second copy must not overwrite the destination
        fs::write(src.path().join(".git/config"), "changed").unwrap();
        copy_unless_exists(&src_str, &dst_str, ".git").unwrap();
        assert_eq!(
            fs::read_to_string(dst.path().join(".git/config")).unwrap(),
            "[core]"
        );
    }

    #[test]
    fn test_copy_unless_exists_missing_source_is_a_noop() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        copy_unless_exists(
            &src.path().to_string_lossy(),
            &dst.path().to_string_lossy(),
            ".gitignore",
        )
        .unwrap();
        assert!(!dst.path().join(".gitignore").exists());
    }
}
