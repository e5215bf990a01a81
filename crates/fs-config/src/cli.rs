use clap::Parser;
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "fs-config",
    version,
    about = "Print uid, gid and mode for filesystem image paths read from stdin"
)]
pub struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = "fs-config.yaml")]
    pub config: PathBuf,

    /// Path to the rules file (overrides settings file; defaults to
    /// fs_config.h next to the executable)
    #[arg(short, long)]
    pub rules: Option<PathBuf>,

    /// Output format (overrides settings file setting)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Exit non-zero when the rules file cannot be loaded and no default
    /// policy is configured
    #[arg(long)]
    pub require_rules: bool,

    /// Log level (overrides settings file setting; RUST_LOG takes precedence)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_arguments() {
        let cli = Cli::try_parse_from(["fs-config"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("fs-config.yaml"));
        assert!(cli.rules.is_none());
        assert!(cli.format.is_none());
        assert!(!cli.require_rules);
    }

    #[test]
    fn overrides_are_parsed() {
        let cli = Cli::try_parse_from([
            "fs-config",
            "--rules",
            "/out/fs_config.h",
            "--format",
            "json",
            "--require-rules",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.rules, Some(PathBuf::from("/out/fs_config.h")));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(cli.require_rules);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["fs-config", "--format", "xml"]).is_err());
    }
}
