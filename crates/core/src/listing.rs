//! Parsers for the host runner's plain-text output formats.
//!
//! The runner prints listings for humans; these helpers turn the few
//! shapes the utilities rely on back into data.

use crate::error::{Error, Result};

/// One script from grouped `ls --plain` output, where `#tag` tokens
/// open a tag group and scripts are printed as `name(type)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListedScript {
    pub name: String,
    pub ty: String,
    pub tags: Vec<String>,
}

pub fn parse_grouped_ls(raw: &str) -> Vec<ListedScript> {
    let mut tags: Vec<String> = Vec::new();
    let mut group: Vec<ListedScript> = Vec::new();
    let mut ret: Vec<ListedScript> = Vec::new();

    for token in raw.replace(['[', ']'], " ").split_whitespace() {
        if let Some(tag) = token.strip_prefix('#') {
            // a new tag header closes the previous group
            if !group.is_empty() {
                ret.append(&mut group);
                tags.clear();
            }
            tags.push(tag.to_string());
        } else if let Some((name, rest)) = token.split_once('(') {
            let Some(ty) = rest.strip_suffix(')') else {
                continue;
            };
            let tags = if tags.is_empty() {
                vec!["all".to_string()]
            } else {
                tags.clone()
            };
            group.push(ListedScript {
                name: name.to_string(),
                ty: ty.to_string(),
                tags,
            });
        }
    }
    ret.append(&mut group);
    ret
}

/// One line of `ls --format '{{id}} {{name}}'` output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptRef {
    pub id: u64,
    pub name: String,
}

pub fn parse_id_name(raw: &str) -> Vec<ScriptRef> {
    raw.lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let id = parts.next()?.parse().ok()?;
            let name = parts.next()?.to_string();
            Some(ScriptRef { id, name })
        })
        .collect()
}

/// One line of `top` output: `pid run_id msg...`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub run_id: u64,
    pub msg: String,
}

impl ProcessEntry {
    /// The first token of the message is the script name.
    #[must_use]
    pub fn script_name(&self) -> &str {
        self.msg.split_whitespace().next().unwrap_or("")
    }
}

pub fn parse_top(raw: &str) -> Vec<ProcessEntry> {
    raw.lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let pid = parts.next()?.parse().ok()?;
            let run_id = parts.next()?.parse().ok()?;
            let msg = parts.collect::<Vec<_>>().join(" ");
            Some(ProcessEntry { pid, run_id, msg })
        })
        .collect()
}

/// Whether a file (relative to the script home) belongs to the store.
/// Hidden path segments are skipped, except a leading `.anonymous`
/// directory which holds the numbered anonymous scripts.
#[must_use]
pub fn should_collect(rel_path: &str) -> bool {
    for (i, segment) in rel_path.split('/').enumerate() {
        if i == 0 && segment == ".anonymous" {
            continue;
        }
        if segment.starts_with('.') {
            return false;
        }
    }
    true
}

/// Splits a script file path into `(name, type)`, mapping
/// `.anonymous/<n>.<ext>` back to the anonymous script name `.<n>`.
pub fn extract_name(rel_path: &str) -> Result<(String, String)> {
    let Some((name, ext)) = rel_path.rsplit_once('.') else {
        return Err(Error::Misc(format!(
            "script file without extension: `{rel_path}`"
        )));
    };
    let name = if let Some(anonymous) = name.strip_prefix(".anonymous/") {
        if anonymous.parse::<u64>().is_err() {
            return Err(Error::Misc(format!(
                "unexpected anonymous script name: `{anonymous}`"
            )));
        }
        format!(".{anonymous}")
    } else {
        name.to_string()
    };
    Ok((name, ext.to_string()))
}
