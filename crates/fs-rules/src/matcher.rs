use crate::schema::{RuleKind, WILDCARD};

/// Check whether a directory rule `prefix` covers the directory `path`.
///
/// Directory rules match by plain leading-byte comparison, so `data` covers
/// `data`, `data/app` and also `database`.
pub fn matches_dir(prefix: &str, path: &str) -> bool {
    path.len() >= prefix.len() && path.as_bytes().starts_with(prefix.as_bytes())
}

/// Check whether a file rule `prefix` covers the file `path`.
///
/// * A pattern ending in `*` matches every path that starts with the pattern
///   minus the marker.
/// * Any other pattern must equal the path exactly.
pub fn matches_file(prefix: &str, path: &str) -> bool {
    match prefix.strip_suffix(WILDCARD) {
        Some(stem) => path.as_bytes().starts_with(stem.as_bytes()),
        None => path == prefix,
    }
}

/// Dispatch to the predicate for the partition `kind`.
pub fn matches(kind: RuleKind, prefix: &str, path: &str) -> bool {
    match kind {
        RuleKind::Directory => matches_dir(prefix, path),
        RuleKind::File => matches_file(prefix, path),
    }
}
