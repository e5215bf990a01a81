use tracing::trace;

use crate::matcher;
use crate::resolution::Resolution;
use crate::schema::{RuleKind, RuleTable};

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

impl RuleTable {
    /// Resolve ownership and mode for `path`.
    ///
    /// `path` must already be normalized: no leading or trailing separator.
    /// `kind` selects the directory or file sequence, which is scanned in
    /// table order; the first matching rule wins. When nothing matches the
    /// result is [`Resolution::unmatched`], i.e. uid 0, gid 0 and `base_mode`
    /// unchanged.
    pub fn resolve(&self, path: &str, kind: RuleKind, base_mode: u32) -> Resolution {
        let hit = self
            .rules(kind)
            .iter()
            .enumerate()
            .find(|(_, rule)| matcher::matches(kind, &rule.prefix, path));

        match hit {
            Some((index, rule)) => {
                trace!(path, ?kind, index, prefix = %rule.prefix, "rule matched path");
                Resolution::from_rule(kind, index, rule, base_mode)
            }
            None => {
                trace!(path, ?kind, "no rule matched path");
                Resolution::unmatched(base_mode)
            }
        }
    }

    /// Shorthand for [`resolve`](Self::resolve) on a directory entry.
    pub fn resolve_dir(&self, path: &str, base_mode: u32) -> Resolution {
        self.resolve(path, RuleKind::Directory, base_mode)
    }

    /// Shorthand for [`resolve`](Self::resolve) on a file entry.
    pub fn resolve_file(&self, path: &str, base_mode: u32) -> Resolution {
        self.resolve(path, RuleKind::File, base_mode)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
