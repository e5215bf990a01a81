//! # fs-rules
//!
//! Ownership and permission rules for filesystem image entries.  This crate
//! loads an ordered rule table from a line-oriented text source and resolves
//! the `(uid, gid, mode)` each path should be stamped with.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use fs_rules::{loader, RuleKind};
//!
//! let table = loader::load_rules("fs_config.h");
//! let meta = table.resolve("system/etc/dbus.conf", RuleKind::File, 0o644);
//! println!("{} {} {:o}", meta.uid, meta.gid, meta.mode);
//! ```
//!
//! ## Rules format
//!
//! One rule per line, `<mode> <uid> <gid> <prefix>`, separated by tabs or
//! spaces. A prefix ending in `/` is a directory rule; a file prefix ending in
//! `*` matches by prefix. Lines starting with `#` are comments.

mod error;
pub mod loader;
pub mod matcher;
mod resolution;
mod resolver;
mod schema;

// Re-export primary public API at crate root.
pub use error::{LineError, LoadError};
pub use loader::{LoadReport, SkippedLine};
pub use resolution::{merge_mode, MatchedRule, Resolution};
pub use schema::{Rule, RuleKind, RuleTable, PATH_SEPARATOR, PERMISSION_MASK, WILDCARD};
