//! Runtime configuration
//!
//! Everything lives under one data directory: `$TALLY_HOME` when set,
//! otherwise `~/.tally`. An optional `config.toml` inside it can move the
//! database and change the currency given to new accounts.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::db::models::DEFAULT_CURRENCY;
use crate::error::{Result, TallyError};
use crate::utils::normalize_currency;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "tally.db";

/// On-disk shape of `config.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    database: Option<PathBuf>,
    default_currency: Option<String>,
}

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub database: PathBuf,
    pub default_currency: String,
}

impl Config {
    /// Load settings from the default data directory
    pub fn load() -> Result<Self> {
        Self::load_from_dir(&data_dir()?)
    }

    /// Load settings from `dir`, falling back to defaults when no config file exists
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_file = dir.join(CONFIG_FILE_NAME);

        let file = if config_file.exists() {
            let raw = std::fs::read_to_string(&config_file)
                .with_context(|| format!("Failed to read {:?}", config_file))?;
            toml::from_str::<ConfigFile>(&raw).map_err(|e| {
                TallyError::ConfigError(format!("{}: {}", config_file.display(), e.message()))
            })?
        } else {
            ConfigFile::default()
        };

        let database = match file.database {
            Some(path) if path.is_relative() => dir.join(path),
            Some(path) => path,
            None => dir.join(DB_FILE_NAME),
        };

        let default_currency = match file.default_currency {
            Some(code) => normalize_currency(&code)
                .map_err(|e| TallyError::ConfigError(format!("default_currency: {}", e)))?,
            None => DEFAULT_CURRENCY.to_string(),
        };

        Ok(Self {
            data_dir: dir.to_path_buf(),
            config_file,
            database,
            default_currency,
        })
    }
}

/// Directory holding the database and config file
pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("TALLY_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".tally"))
}
