//! Optional `kumihan.toml` configuration.
//!
//! ```toml
//! [output]
//! title = "My book"
//! lang = "ja"
//! toc = true
//! body_only = false
//! stylesheet = "style.css"
//!
//! [lint]
//! strict = false
//! deny_warnings = false
//! ```
//!
//! Command-line flags override whatever the file says.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CliError, Result};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "kumihan.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: OutputConfig,
    pub lint: LintConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Page title. Defaults to the first heading, then the file stem.
    pub title: Option<String>,
    pub lang: String,
    pub toc: bool,
    pub body_only: bool,
    /// Linked instead of the embedded stylesheet when set.
    pub stylesheet: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            title: None,
            lang: "ja".to_string(),
            toc: true,
            body_only: false,
            stylesheet: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    /// Refuse to write output when the document has parse errors.
    pub strict: bool,
    /// Treat warnings as failures in `lint`.
    pub deny_warnings: bool,
}

impl Config {
    /// Load the explicit config file, or `kumihan.toml` in the working
    /// directory if present, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    log::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Config::default());
                }
                candidate
            }
        };

        let text = fs::read_to_string(&path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Config::from_toml(&text).map_err(|source| CliError::Config {
            path: path.clone(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> std::result::Result<Config, toml::de::Error> {
        toml::from_str(text)
    }
}
