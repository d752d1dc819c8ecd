//! Optional TOML configuration
//!
//! An `apura.toml` beside the inputs can pin the file paths and a fixed
//! reference date, so repeated runs over the same ledger are fully
//! reproducible:
//!
//! ```toml
//! movements = "movements.csv"
//! distributions = "distributions.csv"
//! metadata = "holdings.csv"
//! today = "2025-06-30"
//! ```
//!
//! Command-line flags always win over the config file.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::EngineError;

pub const DEFAULT_CONFIG_FILE: &str = "apura.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub movements: Option<PathBuf>,
    pub distributions: Option<PathBuf>,
    pub metadata: Option<PathBuf>,
    /// Reference date for due-date status, quoted ("2025-06-30")
    pub today: Option<NaiveDate>,
}

/// Load configuration. An explicitly passed path must exist; the default
/// `apura.toml` is optional and silently absent.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    if !path.exists() {
        if required {
            return Err(
                EngineError::ConfigError(format!("config file {:?} not found", path)).into(),
            );
        }
        debug!("no config file at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let config: Config =
        toml::from_str(&raw).with_context(|| format!("failed to parse config file {:?}", path))?;
    debug!("loaded config from {:?}", path);
    Ok(config)
}
