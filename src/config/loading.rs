//! Configuration loading functionality.
//!
//! Handles locating the configuration file, creating a default one on first
//! run, and parsing and validating it.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;
use crate::common::constants::*;
use crate::common::utils::private_path;

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

/// Get the base configuration directory.
/// This returns the directory containing duskcam.toml and, by default, the sun table.
pub fn get_config_base_dir() -> Result<PathBuf> {
    let config_path = get_config_path()?;
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// Get the configuration file path.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("duskcam").join(CONFIG_FILE_NAME))
}

/// Load configuration using automatic path detection.
///
/// This function will create a default configuration file if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
        log_block_start!(
            "Created default configuration at {}",
            private_path(&config_path)
        );
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
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!(
            "Configuration file not found at {}",
            private_path(path)
        );
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let mut config = parse_config(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    config.base_dir = path.parent().map(Path::to_path_buf);

    Ok(config)
}

/// Parse and validate configuration text, then fill in defaults.
pub(crate) fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content)?;

    // Comprehensive configuration validation (validates what the user wrote)
    validate_config(&config)?;

    apply_defaults(&mut config);

    Ok(config)
}

/// Apply default values to configuration fields.
fn apply_defaults(config: &mut Config) {
    if config.daytime_shutter.is_none() {
        config.daytime_shutter = Some(DEFAULT_DAYTIME_SHUTTER);
    }
    if config.max_shutter.is_none() {
        config.max_shutter = Some(DEFAULT_MAX_SHUTTER);
    }
    if config.daytime_gain.is_none() {
        config.daytime_gain = Some(DEFAULT_DAYTIME_GAIN);
    }
    if config.max_gain.is_none() {
        config.max_gain = Some(DEFAULT_MAX_GAIN);
    }

    if config.ramp_steps.is_none() {
        config.ramp_steps = Some(DEFAULT_RAMP_STEPS);
    }
    if config.sunrise_offset_minutes.is_none() {
        config.sunrise_offset_minutes = Some(DEFAULT_SUNRISE_OFFSET_MINUTES);
    }
    if config.sunset_window_minutes.is_none() {
        config.sunset_window_minutes = Some(DEFAULT_SUNSET_WINDOW_MINUTES);
    }
    if config.capture_interval.is_none() {
        config.capture_interval = Some(DEFAULT_CAPTURE_INTERVAL);
    }

    if config.sun_table.is_none() {
        config.sun_table = Some(DEFAULT_SUN_TABLE.to_string());
    }
}
