use std::collections::TryReserveError;

use serde::{Deserialize, Serialize};

/// Path separator that marks a directory rule (or a directory query).
pub const PATH_SEPARATOR: char = '/';

/// Trailing marker that turns a file rule into a prefix match.
pub const WILDCARD: char = '*';

/// Mode bits a rule is allowed to set: permissions plus setuid/setgid/sticky.
pub const PERMISSION_MASK: u32 = 0o7777;

/// Which partition of the table a rule lives in, or what kind of entry a
/// path query refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Directory,
    File,
}

impl RuleKind {
    pub fn is_dir(self) -> bool {
        self == RuleKind::Directory
    }
}

/// One metadata assignment: every entry matching `prefix` gets `uid`, `gid`
/// and the low 12 bits of `mode`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    /// Pattern with any trailing separator already stripped. A file pattern
    /// ending in `*` matches by prefix; other file patterns match exactly.
    pub prefix: String,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
}

impl Rule {
    pub fn new(prefix: impl Into<String>, mode: u32, uid: u32, gid: u32) -> Self {
        Self {
            prefix: prefix.into(),
            mode,
            uid,
            gid,
        }
    }

    /// True when this is a file pattern ending in the wildcard marker.
    pub fn is_wildcard(&self) -> bool {
        self.prefix.ends_with(WILDCARD)
    }
}

/// Ordered rule table split into directory and file sequences.
///
/// Rules are evaluated in table order and the first match wins. The table has
/// no mutating API once built; the loader is its only incremental producer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleTable {
    dirs: Vec<Rule>,
    files: Vec<Rule>,
}

impl RuleTable {
    /// The degraded table used when no rules source could be loaded. Every
    /// lookup against it falls through to the default resolution.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from already-partitioned rule lists.
    pub fn from_rules(dirs: Vec<Rule>, files: Vec<Rule>) -> Self {
        Self { dirs, files }
    }

    /// Reserve room for the expected number of rules without aborting the
    /// process when the allocator refuses.
    pub(crate) fn try_with_capacity(dirs: usize, files: usize) -> Result<Self, TryReserveError> {
        let mut table = Self::default();
        table.dirs.try_reserve(dirs)?;
        table.files.try_reserve(files)?;
        Ok(table)
    }

    pub(crate) fn push(&mut self, kind: RuleKind, rule: Rule) {
        match kind {
            RuleKind::Directory => self.dirs.push(rule),
            RuleKind::File => self.files.push(rule),
        }
    }

    pub fn dirs(&self) -> &[Rule] {
        &self.dirs
    }

    pub fn files(&self) -> &[Rule] {
        &self.files
    }

    /// The sequence scanned for queries of the given kind.
    pub fn rules(&self, kind: RuleKind) -> &[Rule] {
        match kind {
            RuleKind::Directory => &self.dirs,
            RuleKind::File => &self.files,
        }
    }

    /// Total number of rules across both sequences.
    pub fn len(&self) -> usize {
        self.dirs.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }
}
