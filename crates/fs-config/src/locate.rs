use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// File name of the rules table shipped next to the executable.
pub const DEFAULT_RULES_FILE: &str = "fs_config.h";

/// Path of the rules file beside the running executable.
pub fn rules_beside_current_exe() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("failed to resolve current executable path")?;
    Ok(rules_beside(&exe))
}

/// Path of the rules file in the same directory as `exe`.
pub fn rules_beside(exe: &Path) -> PathBuf {
    match exe.parent() {
        Some(dir) => dir.join(DEFAULT_RULES_FILE),
        None => PathBuf::from(DEFAULT_RULES_FILE),
    }
}
