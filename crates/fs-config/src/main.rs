mod cli;
mod config;
mod input;
mod locate;
mod output;
mod pipeline;

use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use fs_rules::{loader, RuleKind, RuleTable};

use crate::cli::Cli;
use crate::config::Config;
use crate::pipeline::Pipeline;

/// Load the rule table, reporting whether the source was usable.
///
/// A failure never stops the run: the empty table makes every path fall back
/// to the default resolution.
fn load_table(rules_path: Option<PathBuf>) -> (RuleTable, bool) {
    let Some(path) = rules_path else {
        return (RuleTable::empty(), false);
    };

    match loader::try_load_rules(&path) {
        // Skipped lines were already logged by the loader.
        Ok(report) => (report.table, true),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "rules file could not be loaded; every path gets the default"
            );
            (RuleTable::empty(), false)
        }
    }
}

/// Exit status once every path has been written.
fn exit_code(loaded: bool, cfg: &Config) -> ExitCode {
    if !loaded && cfg.rules_failure_is_fatal() {
        error!("rules file is required but could not be loaded and no default policy is set");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn main() -> Result<ExitCode> {
    // 1. Parse CLI args.
    let cli = Cli::parse();

    // 2. Load settings, then merge CLI overrides.
    let mut cfg = config::load(&cli.config)?;

    if let Some(ref rules) = cli.rules {
        cfg.rules_file = Some(rules.clone());
    }
    if let Some(format) = cli.format {
        cfg.output.format = format;
    }
    if cli.require_rules {
        cfg.require_rules = true;
    }
    if let Some(ref level) = cli.log_level {
        cfg.logging.level = level.clone();
    }

    // 3. Init tracing-subscriber with JSON format on stderr; stdout carries
    //    the results.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    // 4. Locate and load the rule table.
    let rules_path = match cfg.rules_file.clone() {
        Some(path) => Some(path),
        None => match locate::rules_beside_current_exe() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "cannot locate rules file beside executable");
                None
            }
        },
    };
    let (table, loaded) = load_table(rules_path.clone());

    info!(
        config_file = %cli.config.display(),
        rules_file = ?rules_path,
        loaded,
        dirs = table.dirs().len(),
        files = table.files().len(),
        "rule table ready"
    );

    // 5. Resolve every path from stdin.
    let pipeline = Pipeline::new(&table, cfg.output.format).with_base_modes(
        cfg.base_mode(RuleKind::File),
        cfg.base_mode(RuleKind::Directory),
    );
    let stdin = io::stdin();
    let stdout = io::stdout();
    let stats = pipeline.run(stdin.lock(), BufWriter::new(stdout.lock()))?;

    info!(
        entries = stats.entries,
        matched = stats.matched,
        blank = stats.blank,
        "all paths resolved"
    );

    // 6. Exit status.
    Ok(exit_code(loaded, &cfg))
}
