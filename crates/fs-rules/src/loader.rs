use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{LineError, LoadError};
use crate::schema::{Rule, RuleKind, RuleTable, PATH_SEPARATOR};

/// Lines shorter than this (terminator excluded) cannot hold a rule and are
/// skipped without being reported.
pub const MIN_RULE_LINE_LEN: usize = 10;

const DIR_CAPACITY_HINT: usize = 100;
const FILE_CAPACITY_HINT: usize = 1024;

/// A malformed line that was left out of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the source.
    pub line: usize,
    pub error: LineError,
}

/// A loaded table together with the lines that did not make it in.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub table: RuleTable,
    pub skipped: Vec<SkippedLine>,
}

/// Load the rule table at `path`, degrading to an empty table on failure.
///
/// The failure is logged; every later lookup then falls back to the default
/// resolution, so a missing rules file never stops image construction.
pub fn load_rules(path: impl AsRef<Path>) -> RuleTable {
    let path = path.as_ref();
    match try_load_rules(path) {
        Ok(report) => report.table,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "rules source could not be loaded; using empty rule table"
            );
            RuleTable::empty()
        }
    }
}

/// Load the rule table at `path`, reporting why it could not be loaded.
pub fn try_load_rules(path: impl AsRef<Path>) -> Result<LoadReport, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let report = parse_rules_from_reader(BufReader::new(file))?;

    info!(
        path = %path.display(),
        dirs = report.table.dirs().len(),
        files = report.table.files().len(),
        skipped = report.skipped.len(),
        "rule table loaded"
    );

    Ok(report)
}

/// Parse a rule table from an in-memory string.
///
/// This is the primary entry point used in tests.
pub fn parse_rules(text: &str) -> Result<LoadReport, LoadError> {
    parse_rules_from_reader(text.as_bytes())
}

/// Parse a rule table from any buffered reader, one rule per line.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected; they can
/// only appear inside a prefix, which then simply never matches.
pub fn parse_rules_from_reader<R: BufRead>(reader: R) -> Result<LoadReport, LoadError> {
    let mut report = LoadReport {
        table: RuleTable::try_with_capacity(DIR_CAPACITY_HINT, FILE_CAPACITY_HINT)?,
        skipped: Vec::new(),
    };

    for (idx, chunk) in reader.split(b'\n').enumerate() {
        let bytes = chunk?;
        let line = String::from_utf8_lossy(&bytes);
        let line_no = idx + 1;

        match parse_line(&line) {
            Ok(Some((kind, rule))) => {
                debug!(line = line_no, ?kind, prefix = %rule.prefix, "parsed rule");
                report.table.push(kind, rule);
            }
            Ok(None) => {}
            Err(error) => {
                warn!(line = line_no, error = %error, "skipping malformed rules line");
                report.skipped.push(SkippedLine {
                    line: line_no,
                    error,
                });
            }
        }
    }

    Ok(report)
}

/// Parse one line of the rules format: `<mode> <uid> <gid> <prefix>`.
///
/// Returns `Ok(None)` for lines that carry no rule (too short, blank, or a
/// `#` comment). A prefix ending in `/` yields a directory rule with that
/// separator removed.
pub fn parse_line(line: &str) -> Result<Option<(RuleKind, Rule)>, LineError> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.len() < MIN_RULE_LINE_LEN {
        return Ok(None);
    }

    let body = line.trim_start();
    if body.is_empty() || body.starts_with('#') {
        return Ok(None);
    }

    let mut rest = body;
    let mode = parse_mode(take_field(&mut rest, "mode")?)?;
    let uid = parse_id(take_field(&mut rest, "uid")?, "uid")?;
    let gid = parse_id(take_field(&mut rest, "gid")?, "gid")?;

    // The prefix is everything after gid, so it may contain spaces.
    let prefix = rest.trim();
    if prefix.is_empty() {
        return Err(LineError::MissingField { field: "prefix" });
    }

    let (kind, prefix) = classify(prefix);
    Ok(Some((kind, Rule::new(prefix, mode, uid, gid))))
}

/// Split a configured prefix into its partition and stored pattern.
pub fn classify(prefix: &str) -> (RuleKind, &str) {
    match prefix.strip_suffix(PATH_SEPARATOR) {
        Some(stripped) => (RuleKind::Directory, stripped),
        None => (RuleKind::File, prefix),
    }
}

/// Parse a mode literal the way `strtoul(s, NULL, 0)` does: `0x` prefix is
/// hex, a leading `0` is octal, anything else is decimal. Signs are rejected.
pub fn parse_mode(token: &str) -> Result<u32, LineError> {
    let invalid = || LineError::InvalidNumber {
        field: "mode",
        value: token.to_string(),
    };

    let (digits, radix) = if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        (hex, 16)
    } else if token.len() > 1 && token.starts_with('0') {
        (&token[1..], 8)
    } else {
        (token, 10)
    };

    if !starts_with_digit(digits, radix) {
        return Err(invalid());
    }
    u32::from_str_radix(digits, radix).map_err(|_| invalid())
}

fn parse_id(token: &str, field: &'static str) -> Result<u32, LineError> {
    let invalid = || LineError::InvalidNumber {
        field,
        value: token.to_string(),
    };

    if !starts_with_digit(token, 10) {
        return Err(invalid());
    }
    token.parse::<u32>().map_err(|_| invalid())
}

/// `from_str_radix` tolerates a leading `+`; the rules format does not.
fn starts_with_digit(digits: &str, radix: u32) -> bool {
    digits.chars().next().is_some_and(|c| c.is_digit(radix))
}

/// Split the next whitespace-delimited field off the front of `rest`.
fn take_field<'a>(rest: &mut &'a str, field: &'static str) -> Result<&'a str, LineError> {
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        return Err(LineError::MissingField { field });
    }
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (token, tail) = trimmed.split_at(end);
    *rest = tail;
    Ok(token)
}
