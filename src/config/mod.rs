//! Configuration system for duskcam.
//!
//! Settings come from a TOML file, `duskcam.toml`, looked up in:
//! 1. the directory given with `--config <dir>`
//! 2. **XDG_CONFIG_HOME**/duskcam/duskcam.toml
//!
//! A commented default file is written on first run. Every field is
//! optional; missing fields take the defaults in
//! [`crate::common::constants`].
//!
//! ```toml
//! #[Exposure]
//! daytime_shutter = 4489          # Daytime shutter speed in microseconds (1-1000000000)
//! max_shutter = 12000000          # Full-night shutter speed in microseconds (1-1000000000)
//! daytime_gain = 0                # Daytime analog gain, never below 1 in practice (0-64)
//! max_gain = 8                    # Full-night analog gain (1-64)
//!
//! #[Transitions]
//! ramp_steps = 60                 # Captures from daytime to full-night values (1-10000)
//! sunrise_offset_minutes = -60    # Sunrise ramp start relative to sunrise (-720 to -1)
//! sunset_window_minutes = 120     # Sunset ramp length after sunset (1-720)
//! capture_interval = 60           # Seconds between captures (1-86400)
//!
//! #[Files]
//! sun_table = "sun_data.json"     # Sun times table, relative to this directory
//! ```
//!
//! Relative paths are resolved against the directory holding the loaded
//! file, so a config directory can be moved as a unit.

pub mod builder;
pub mod loading;
pub mod validation;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::common::constants::*;
use crate::common::utils::{format_shutter, private_path};
use crate::core::ExposureSettings;
use crate::state::default_state_path;

pub use builder::create_default_config;
pub use loading::{
    get_config_base_dir, get_config_path, get_custom_config_dir, load, load_from_path,
    set_config_dir,
};

/// Settings loaded from `duskcam.toml`.
///
/// ## Configuration Categories
///
/// - **Exposure bounds**: `daytime_shutter`, `max_shutter`, `daytime_gain`, `max_gain`
/// - **Transitions**: `ramp_steps`, `sunrise_offset_minutes`,
///   `sunset_window_minutes`, `capture_interval`
/// - **Files**: `sun_table`, `state_file`, `log_file`
/// - **Location** (only used by `duskcam suntable`): `latitude`, `longitude`, `timezone`
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    pub daytime_shutter: Option<u64>, // microseconds
    pub max_shutter: Option<u64>,     // microseconds
    pub daytime_gain: Option<f64>,
    pub max_gain: Option<f64>,
    pub ramp_steps: Option<u32>,
    pub sunrise_offset_minutes: Option<i64>, // negative, before sunrise
    pub sunset_window_minutes: Option<u64>,
    pub capture_interval: Option<u64>, // seconds
    pub sun_table: Option<String>,
    pub state_file: Option<String>,
    pub log_file: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>, // IANA name, e.g. "Europe/Paris"

    /// Directory of the loaded file, for resolving relative paths
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration using the module's load function
    pub fn load() -> Result<Self> {
        load()
    }

    /// Load from path using the module's load_from_path function
    pub fn load_from_path(path: &Path) -> Result<Self> {
        load_from_path(path)
    }

    /// Lower gain bound: the configured daytime gain, but never below 1.
    pub fn min_gain(&self) -> f64 {
        self.daytime_gain
            .unwrap_or(DEFAULT_DAYTIME_GAIN)
            .max(GAIN_FLOOR)
    }

    /// Resolve the controller parameters.
    pub fn exposure_settings(&self) -> ExposureSettings {
        ExposureSettings {
            daytime_shutter: self.daytime_shutter.unwrap_or(DEFAULT_DAYTIME_SHUTTER),
            max_shutter: self.max_shutter.unwrap_or(DEFAULT_MAX_SHUTTER),
            min_gain: self.min_gain(),
            max_gain: self.max_gain.unwrap_or(DEFAULT_MAX_GAIN),
            ramp_steps: self.ramp_steps.unwrap_or(DEFAULT_RAMP_STEPS),
            sunrise_offset_minutes: self
                .sunrise_offset_minutes
                .unwrap_or(DEFAULT_SUNRISE_OFFSET_MINUTES),
            sunset_window_minutes: self
                .sunset_window_minutes
                .unwrap_or(DEFAULT_SUNSET_WINDOW_MINUTES),
        }
    }

    pub fn capture_interval(&self) -> u64 {
        self.capture_interval.unwrap_or(DEFAULT_CAPTURE_INTERVAL)
    }

    /// Resolve a configured path against the config directory.
    fn resolve(&self, value: &str) -> PathBuf {
        let path = expand_home(value);
        if path.is_absolute() {
            return path;
        }
        match &self.base_dir {
            Some(base) => base.join(path),
            None => path,
        }
    }

    pub fn sun_table_path(&self) -> PathBuf {
        self.resolve(self.sun_table.as_deref().unwrap_or(DEFAULT_SUN_TABLE))
    }

    /// Configured state file, or `$XDG_STATE_HOME/duskcam/camera_state.json`.
    pub fn state_file_path(&self) -> PathBuf {
        match self.state_file.as_deref() {
            Some(path) => self.resolve(path),
            None => default_state_path(),
        }
    }

    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.log_file.as_deref().map(|path| self.resolve(path))
    }

    /// Parse the configured timezone, if any.
    pub fn timezone(&self) -> Result<Option<Tz>> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|e| anyhow::anyhow!("{e}"))
                    .with_context(|| format!("Unknown timezone '{name}'"))
            })
            .transpose()
    }

    pub fn log_config(&self) {
        let settings = self.exposure_settings();

        match &self.base_dir {
            Some(dir) => log_block_start!("Loaded configuration from {}", private_path(dir)),
            None => log_block_start!("Loaded configuration"),
        }

        log_indented!(
            "Shutter: {} → {}",
            format_shutter(settings.daytime_shutter),
            format_shutter(settings.max_shutter)
        );
        log_indented!("Gain: {:.1} → {:.1}", settings.min_gain, settings.max_gain);
        log_indented!(
            "Ramp: {} steps every {} seconds",
            settings.ramp_steps,
            self.capture_interval()
        );
        log_indented!(
            "Sunrise ramp starts {} minutes before sunrise",
            settings.sunrise_offset_minutes.unsigned_abs()
        );
        log_indented!(
            "Sunset ramp lasts {} minutes",
            settings.sunset_window_minutes
        );
        log_indented!("Sun table: {}", private_path(&self.sun_table_path()));
        log_indented!("State file: {}", private_path(&self.state_file_path()));

        if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            let lat_dir = if lat >= 0.0 { "N" } else { "S" };
            let lon_dir = if lon >= 0.0 { "E" } else { "W" };
            log_indented!(
                "Location: {:.3}°{}, {:.3}°{}",
                lat.abs(),
                lat_dir,
                lon.abs(),
                lon_dir
            );
        }
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(value)
}
