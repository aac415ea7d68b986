//! Configuration loading functionality.
//!
//! Resolves the settings path, creates a default file on first use and
//! parses and validates `photoperiod.toml`.

use anyhow::{Context, Result};
use chrono::NaiveTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;
use crate::constants::*;

/// Global configuration directory, set once at startup
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
/// This can only be called once, typically at startup.
/// Returns an error if already set.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// Get the custom configuration directory if one was set.
/// Returns None if using the default directory.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Replace the home directory prefix with `~` for display.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

/// Today's local midnight in export format, the default `startDate`.
pub fn default_start_date() -> String {
    crate::time_source::now()
        .date()
        .and_time(NaiveTime::MIN)
        .format(EXPORT_DATE_FORMAT)
        .to_string()
}

/// Load configuration using automatic path detection.
///
/// This function will create a default configuration file if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
    }

    load_from_path(&config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            private_path(&config_path)
        )
    })
}

/// Load configuration from a specific path.
///
/// This version does NOT create a default config if the path doesn't exist.
pub fn load_from_path(path: &PathBuf) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!(
            "Configuration file not found at {}",
            private_path(path)
        );
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    validate_config(&config)?;

    Ok(config)
}

/// Get the configuration file path.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
