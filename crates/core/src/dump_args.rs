//! Models for the host runner's `--dump-args` JSON output.
//!
//! Only the parts the history utilities consume are modeled; unknown
//! fields are ignored.

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct DumpedArgs {
    #[serde(default)]
    pub filter: Vec<String>,
    #[serde(default)]
    pub timeless: bool,
    #[serde(default)]
    pub recent: Option<u32>,
    pub subcmd: Subcmd,
}

#[derive(Debug, Deserialize)]
pub struct Subcmd {
    #[serde(rename = "History")]
    pub history: History,
}

#[derive(Debug, Deserialize)]
pub struct History {
    pub subcmd: HistorySubcmd,
}

#[derive(Debug, Deserialize)]
pub struct HistorySubcmd {
    #[serde(rename = "Show")]
    pub show: HistoryShow,
}

#[derive(Debug, Deserialize)]
pub struct HistoryShow {
    pub script: String,
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    10
}

impl DumpedArgs {
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
