use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::warn;

use fs_rules::RuleKind;

use crate::output::OutputFormat;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Rules file; when unset, `fs_config.h` beside the executable is used.
    #[serde(default)]
    pub rules_file: Option<PathBuf>,
    #[serde(default)]
    pub require_rules: bool,
    /// Base modes for entries; without them every query starts from mode 0.
    #[serde(default)]
    pub defaults: Option<DefaultPolicy>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Base mode handed to the resolver for an entry of `kind`.
    pub fn base_mode(&self, kind: RuleKind) -> u32 {
        match (&self.defaults, kind) {
            (Some(d), RuleKind::Directory) => d.dir_mode,
            (Some(d), RuleKind::File) => d.file_mode,
            (None, _) => 0,
        }
    }

    /// Whether a failed rules load should turn into a non-zero exit.
    pub fn rules_failure_is_fatal(&self) -> bool {
        self.require_rules && self.defaults.is_none()
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct DefaultPolicy {
    #[serde(default = "default_file_mode", deserialize_with = "deserialize_mode")]
    pub file_mode: u32,
    #[serde(default = "default_dir_mode", deserialize_with = "deserialize_mode")]
    pub dir_mode: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default-value functions used by serde
// ---------------------------------------------------------------------------

fn default_file_mode() -> u32 {
    0o644
}

fn default_dir_mode() -> u32 {
    0o755
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Accept a mode as a YAML integer or as a string literal (`"0644"`,
/// `"0o644"`, `"0x1a4"`, `"420"`).
fn deserialize_mode<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMode {
        Number(u32),
        Text(String),
    }

    match RawMode::deserialize(deserializer)? {
        RawMode::Number(n) => Ok(n),
        RawMode::Text(s) => {
            let s = s.trim();
            let parsed = match s.strip_prefix("0o") {
                Some(octal) => u32::from_str_radix(octal, 8).ok(),
                None => fs_rules::loader::parse_mode(s).ok(),
            };
            parsed.ok_or_else(|| serde::de::Error::custom(format!("invalid mode '{s}'")))
        }
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Load settings from a YAML file.
///
/// If the file does not exist a default configuration is returned and a
/// warning is emitted, so the tool runs with no settings file at all.
pub fn load(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        warn!(
            path = %path.display(),
            "settings file not found; using defaults"
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read settings file {}: {e}", path.display()))?;

    let config: Config = serde_yml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse settings file {}: {e}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load(Path::new("/does/not/exist/fs-config.yaml")).unwrap();
        assert!(cfg.rules_file.is_none());
        assert!(!cfg.require_rules);
        assert!(cfg.defaults.is_none());
        assert_eq!(cfg.output.format, OutputFormat::Text);
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn full_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
rules_file: /out/target/fs_config.h
require_rules: true
defaults:
  file_mode: "0640"
  dir_mode: 0o750
output:
  format: json
logging:
  level: debug
"#
        )
        .unwrap();

        let cfg = load(file.path()).unwrap();
        assert_eq!(cfg.rules_file, Some(PathBuf::from("/out/target/fs_config.h")));
        assert!(cfg.require_rules);
        assert_eq!(
            cfg.defaults,
            Some(DefaultPolicy {
                file_mode: 0o640,
                dir_mode: 0o750,
            })
        );
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn partial_defaults_fill_in_modes() {
        let cfg: Config = serde_yml::from_str("defaults:\n  file_mode: 420\n").unwrap();
        let d = cfg.defaults.unwrap();
        assert_eq!(d.file_mode, 0o644);
        assert_eq!(d.dir_mode, 0o755);
    }

    #[test]
    fn invalid_mode_is_rejected() {
        let err = serde_yml::from_str::<Config>("defaults:\n  file_mode: \"rw-r--r--\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("invalid mode"), "unexpected error: {err}");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "require_rules: [not, a, bool]").unwrap();
        let err = load(file.path()).unwrap_err();
        assert!(
            err.to_string().contains("failed to parse settings file"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn base_mode_follows_defaults() {
        let mut cfg = Config::default();
        assert_eq!(cfg.base_mode(RuleKind::File), 0);
        assert_eq!(cfg.base_mode(RuleKind::Directory), 0);

        cfg.defaults = Some(DefaultPolicy {
            file_mode: 0o644,
            dir_mode: 0o755,
        });
        assert_eq!(cfg.base_mode(RuleKind::File), 0o644);
        assert_eq!(cfg.base_mode(RuleKind::Directory), 0o755);
    }

    #[test]
    fn rules_failure_is_fatal_only_without_defaults() {
        let mut cfg = Config::default();
        assert!(!cfg.rules_failure_is_fatal());

        cfg.require_rules = true;
        assert!(cfg.rules_failure_is_fatal());

        cfg.defaults = Some(DefaultPolicy {
            file_mode: 0o644,
            dir_mode: 0o755,
        });
        assert!(!cfg.rules_failure_is_fatal());
    }
}
