use fs_rules::{RuleKind, PATH_SEPARATOR};

/// One normalized path read from the input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Path without leading or trailing separator.
    pub path: String,
    pub kind: RuleKind,
}

/// Turn a raw input line into a [`PathEntry`].
///
/// A trailing `/` marks a directory and is removed (only one). Leading
/// separators are dropped. Returns `None` for lines that name no path.
pub fn parse_entry(line: &str) -> Option<PathEntry> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let (kind, path) = match line.strip_suffix(PATH_SEPARATOR) {
        Some(stripped) => (RuleKind::Directory, stripped),
        None => (RuleKind::File, line),
    };
    let path = path.trim_start_matches(PATH_SEPARATOR);

    if path.is_empty() {
        return None;
    }

    Some(PathEntry {
        path: path.to_string(),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, kind: RuleKind) -> Option<PathEntry> {
        Some(PathEntry {
            path: path.to_string(),
            kind,
        })
    }

    #[test]
    fn file_line() {
        assert_eq!(
            parse_entry("system/etc/dbus.conf\n"),
            entry("system/etc/dbus.conf", RuleKind::File)
        );
    }

    #[test]
    fn directory_line_loses_trailing_separator() {
        assert_eq!(parse_entry("data/app/"), entry("data/app", RuleKind::Directory));
        assert_eq!(parse_entry("data/app/\r\n"), entry("data/app", RuleKind::Directory));
    }

    #[test]
    fn only_one_trailing_separator_is_removed() {
        assert_eq!(parse_entry("data//"), entry("data/", RuleKind::Directory));
    }

    #[test]
    fn leading_separators_are_dropped() {
        assert_eq!(parse_entry("/system/bin/sh"), entry("system/bin/sh", RuleKind::File));
        assert_eq!(parse_entry("//vendor/"), entry("vendor", RuleKind::Directory));
    }

    #[test]
    fn empty_lines_name_nothing() {
        assert_eq!(parse_entry(""), None);
        assert_eq!(parse_entry("\n"), None);
        assert_eq!(parse_entry("/"), None);
    }
}
