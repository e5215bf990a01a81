use std::borrow::Cow;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use fs_rules::{RuleKind, RuleTable};

use crate::input::parse_entry;
use crate::output::{write_entry, OutputFormat};

/// Counters reported once the input stream is exhausted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub entries: usize,
    pub matched: usize,
    pub blank: usize,
}

/// Resolves every path of an input stream against one rule table.
pub struct Pipeline<'a> {
    table: &'a RuleTable,
    format: OutputFormat,
    file_mode: u32,
    dir_mode: u32,
}

impl<'a> Pipeline<'a> {
    pub fn new(table: &'a RuleTable, format: OutputFormat) -> Self {
        Self {
            table,
            format,
            file_mode: 0,
            dir_mode: 0,
        }
    }

    /// Set the base modes queries start from before a rule is applied.
    pub fn with_base_modes(mut self, file_mode: u32, dir_mode: u32) -> Self {
        self.file_mode = file_mode;
        self.dir_mode = dir_mode;
        self
    }

    /// Read paths line by line from `input` and write one result per path.
    ///
    /// A line that is not valid UTF-8 is converted lossily and still resolved,
    /// so one bad name never drops the entries after it.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<RunStats> {
        let mut stats = RunStats::default();

        for (idx, chunk) in input.split(b'\n').enumerate() {
            let bytes = chunk.context("failed to read path from input")?;
            let line = String::from_utf8_lossy(&bytes);
            if let Cow::Owned(_) = line {
                warn!(
                    line = idx + 1,
                    path = %line,
                    "input path is not valid UTF-8; replacing invalid bytes"
                );
            }
            let Some(entry) = parse_entry(&line) else {
                stats.blank += 1;
                continue;
            };

            let base_mode = match entry.kind {
                RuleKind::Directory => self.dir_mode,
                RuleKind::File => self.file_mode,
            };
            let meta = self.table.resolve(&entry.path, entry.kind, base_mode);
            if meta.is_match() {
                stats.matched += 1;
            } else {
                debug!(path = %entry.path, kind = ?entry.kind, "no rule matched; using default");
            }
            stats.entries += 1;

            write_entry(&mut output, self.format, &entry, &meta)
                .context("failed to write result")?;
        }

        output.flush().context("failed to flush output")?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fs_rules::loader::parse_rules;
    use std::io::Cursor;

    const RULES: &str = "\
00440\t1002\t1002\tsystem/etc/*
00771\t1000\t1000\tdata/app/
";

    fn run(pipeline: &Pipeline<'_>, input: &str) -> (String, RunStats) {
        let mut out = Vec::new();
        let stats = pipeline.run(Cursor::new(input), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn file_and_directory_lines_are_stamped() {
        let table = parse_rules(RULES).unwrap().table;
        let pipeline = Pipeline::new(&table, OutputFormat::Text);

        let (out, stats) = run(&pipeline, "system/etc/dbus.conf\ndata/app/\n");
        assert_eq!(out, "system/etc/dbus.conf 1002 1002 440\ndata/app 1000 1000 771\n");
        assert_eq!(
            stats,
            RunStats {
                entries: 2,
                matched: 2,
                blank: 0,
            }
        );
    }

    #[test]
    fn unmatched_paths_use_base_modes() {
        let table = parse_rules(RULES).unwrap().table;
        let pipeline = Pipeline::new(&table, OutputFormat::Text).with_base_modes(0o644, 0o755);

        let (out, stats) = run(&pipeline, "vendor/build.prop\nvendor/\n");
        assert_eq!(out, "vendor/build.prop 0 0 644\nvendor 0 0 755\n");
        assert_eq!(stats.matched, 0);
    }

    #[test]
    fn empty_table_without_defaults_prints_zeroes() {
        let table = RuleTable::empty();
        let pipeline = Pipeline::new(&table, OutputFormat::Text);

        let (out, _) = run(&pipeline, "system/bin/sh\n");
        assert_eq!(out, "system/bin/sh 0 0 0\n");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let table = parse_rules(RULES).unwrap().table;
        let pipeline = Pipeline::new(&table, OutputFormat::Text);

        let (out, stats) = run(&pipeline, "\nsystem/etc/hosts\n\n");
        assert_eq!(out, "system/etc/hosts 1002 1002 440\n");
        assert_eq!(stats.blank, 2);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn json_output() {
        let table = parse_rules(RULES).unwrap().table;
        let pipeline = Pipeline::new(&table, OutputFormat::Json);

        let (out, _) = run(&pipeline, "data/app/\n");
        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(value["path"], "data/app");
        assert_eq!(value["gid"], 1000);
    }

    #[test]
    fn invalid_utf8_line_does_not_stop_the_run() {
        let table = parse_rules(RULES).unwrap().table;
        let pipeline = Pipeline::new(&table, OutputFormat::Text);

        let input: &[u8] = b"system/etc/a\nsystem/etc/\xffbad\nsystem/etc/b\n";
        let mut out = Vec::new();
        let stats = pipeline.run(input, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "system/etc/a 1002 1002 440\n\
             system/etc/\u{FFFD}bad 1002 1002 440\n\
             system/etc/b 1002 1002 440\n"
        );
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.matched, 3);
    }

    #[test]
    fn final_line_without_newline_is_processed() {
        let table = parse_rules(RULES).unwrap().table;
        let pipeline = Pipeline::new(&table, OutputFormat::Text);

        let (out, _) = run(&pipeline, "data/app/");
        assert_eq!(out, "data/app 1000 1000 771\n");
    }
}
