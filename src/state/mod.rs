//! Persisted exposure state, following XDG Base Directory standards.
//!
//! The state file is the only thing carried between invocations: the shutter
//! speed and gain reached so far in a ramp, the capture counter, and the
//! fractional gain carry. It lives in `$XDG_STATE_HOME/duskcam/` unless the
//! configuration points elsewhere.
//!
//! Loading never fails. A missing file is the normal cold start, and an
//! unreadable or corrupt file is reported through [`LoadOutcome::Defaulted`]
//! so callers can log it, while the controller simply starts from daytime
//! values.

pub mod store;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::common::constants::STATE_FILE_NAME;
use crate::core::ExposureSettings;

pub use store::{JsonStateStore, MemoryStateStore};

/// Exposure values persisted between captures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureState {
    /// Shutter speed in microseconds
    pub shutter_speed: u64,
    /// Analog gain multiplier
    pub gain: f64,
    /// Captures since the last daytime reset
    #[serde(default)]
    pub photo_counter: u64,
    /// Sub-unit gain carried between captures, in `[-1, 1)`
    #[serde(default)]
    pub gain_increment_counter: f64,
}

impl ExposureState {
    /// Daytime defaults for the given settings.
    pub fn daytime(settings: &ExposureSettings) -> Self {
        Self {
            shutter_speed: settings.daytime_shutter,
            gain: settings.min_gain,
            photo_counter: 0,
            gain_increment_counter: 0.0,
        }
    }

    /// Reject values no controller run could have produced.
    ///
    /// Range against the configured bounds is not checked here; the
    /// controller clamps on ingest so a tightened configuration takes effect
    /// smoothly instead of resetting a ramp in progress.
    pub fn validate(&self) -> Result<()> {
        if !self.gain.is_finite() || self.gain < 0.0 {
            anyhow::bail!("gain must be a non-negative number (got {})", self.gain);
        }
        if !self.gain_increment_counter.is_finite()
            || !(-1.0..1.0).contains(&self.gain_increment_counter)
        {
            anyhow::bail!(
                "gain_increment_counter must be in [-1, 1) (got {})",
                self.gain_increment_counter
            );
        }
        Ok(())
    }
}

/// Why [`StateStore::load`] fell back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultReason {
    /// No state file yet (cold start)
    Missing,
    /// The file exists but could not be read
    Unreadable(String),
    /// The file was read but its contents are not a valid state
    Corrupt(String),
}

impl fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultReason::Missing => f.write_str("no saved state"),
            DefaultReason::Unreadable(e) => write!(f, "state file unreadable: {e}"),
            DefaultReason::Corrupt(e) => write!(f, "state file corrupt: {e}"),
        }
    }
}

/// Result of loading persisted state.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(ExposureState),
    Defaulted {
        state: ExposureState,
        reason: DefaultReason,
    },
}

impl LoadOutcome {
    pub fn state(&self) -> &ExposureState {
        match self {
            LoadOutcome::Loaded(state) | LoadOutcome::Defaulted { state, .. } => state,
        }
    }

    pub fn into_state(self) -> ExposureState {
        match self {
            LoadOutcome::Loaded(state) | LoadOutcome::Defaulted { state, .. } => state,
        }
    }

    pub fn default_reason(&self) -> Option<&DefaultReason> {
        match self {
            LoadOutcome::Loaded(_) => None,
            LoadOutcome::Defaulted { reason, .. } => Some(reason),
        }
    }
}

/// Storage for the exposure state between invocations.
///
/// Single writer is assumed: concurrent invocations are last-writer-wins.
#[cfg_attr(test, mockall::automock)]
pub trait StateStore {
    /// Load the saved state, or defaults with the reason they were used.
    fn load(&self) -> LoadOutcome;

    /// Replace the saved state wholesale.
    fn save(&self, state: &ExposureState) -> Result<()>;
}

/// Default location of the state file.
///
/// `$XDG_STATE_HOME/duskcam/camera_state.json`, falling back to
/// `~/.local/state` and finally `/tmp` when no home directory is known.
pub fn default_state_path() -> PathBuf {
    let state_home = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local/state")
        });

    state_home.join("duskcam").join(STATE_FILE_NAME)
}

#[cfg(test)]
mod tests;
