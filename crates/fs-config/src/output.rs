use std::io::Write;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use fs_rules::{Resolution, RuleKind};

use crate::input::PathEntry;

/// How each resolved entry is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `<path> <uid> <gid> <octal-mode>`
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    path: &'a str,
    kind: RuleKind,
    uid: u32,
    gid: u32,
    mode: u32,
    matched_prefix: Option<&'a str>,
}

/// Write one result line for `entry`.
pub fn write_entry<W: Write>(
    out: &mut W,
    format: OutputFormat,
    entry: &PathEntry,
    meta: &Resolution,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "{} {} {} {:o}", entry.path, meta.uid, meta.gid, meta.mode)?;
        }
        OutputFormat::Json => {
            let record = JsonRecord {
                path: &entry.path,
                kind: entry.kind,
                uid: meta.uid,
                gid: meta.gid,
                mode: meta.mode,
                matched_prefix: meta.matched.as_ref().map(|m| m.prefix.as_str()),
            };
            serde_json::to_writer(&mut *out, &record)?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}
