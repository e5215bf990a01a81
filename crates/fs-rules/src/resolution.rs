use serde::Serialize;

use crate::schema::{Rule, RuleKind, PERMISSION_MASK};

/// The metadata assigned to one path after looking it up in a rule table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Resolution {
    pub uid: u32,
    pub gid: u32,
    /// Base mode with its low 12 bits replaced by the rule's mode.
    pub mode: u32,
    /// The rule that produced this result; `None` when nothing matched.
    pub matched: Option<MatchedRule>,
}

/// Identifies the rule a [`Resolution`] came from.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MatchedRule {
    pub kind: RuleKind,
    /// Position within the directory or file sequence.
    pub index: usize,
    pub prefix: String,
}

impl Resolution {
    /// The result for a path no rule covers: root ownership and the base mode
    /// left untouched.
    pub fn unmatched(base_mode: u32) -> Self {
        Self {
            uid: 0,
            gid: 0,
            mode: base_mode,
            matched: None,
        }
    }

    /// The result for a path covered by `rule`.
    pub fn from_rule(kind: RuleKind, index: usize, rule: &Rule, base_mode: u32) -> Self {
        Self {
            uid: rule.uid,
            gid: rule.gid,
            mode: merge_mode(base_mode, rule.mode),
            matched: Some(MatchedRule {
                kind,
                index,
                prefix: rule.prefix.clone(),
            }),
        }
    }

    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }

    /// The permission and special bits only, as printed in octal.
    pub fn permission_bits(&self) -> u32 {
        self.mode & PERMISSION_MASK
    }
}

/// Replace the low 12 bits of `base` with `rule_mode`, keeping file-type and
/// any other high bits.
pub fn merge_mode(base: u32, rule_mode: u32) -> u32 {
    (base & !PERMISSION_MASK) | (rule_mode & PERMISSION_MASK)
}
