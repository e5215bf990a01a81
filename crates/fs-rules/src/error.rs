use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a rules source from producing a table at all.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The rules file is missing or cannot be opened.
    #[error("rules source unavailable: {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading failed part way through the source.
    #[error("failed to read rules source: {0}")]
    Read(#[from] std::io::Error),

    /// Not enough memory to hold the rule sequences.
    #[error("failed to allocate rule table: {0}")]
    Allocation(#[from] TryReserveError),
}

/// Why a single rules line was rejected. Never fatal; the line is skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LineError {
    #[error("missing {field} field")]
    MissingField { field: &'static str },

    #[error("invalid {field} value '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}
