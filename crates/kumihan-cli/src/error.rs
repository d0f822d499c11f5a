//! Error types for the kumihan command.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can make a command fail.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("cannot read '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write '{}': {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid config '{}': {source}", .path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("output '{}' would overwrite the input, give an OUTPUT path", .0.display())]
    OverwriteInput(PathBuf),

    #[error("{0} parse error(s), output not written")]
    ParseFailed(usize),

    #[error("lint failed: {errors} error(s), {warnings} warning(s)")]
    Lint { errors: usize, warnings: usize },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
