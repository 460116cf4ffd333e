//! # Duskcam Library
//!
//! Internal library for the duskcam binary: exposure ramping for timelapse
//! cameras across sunset and sunrise.
//!
//! This library exists to enable testing of the controller and its
//! collaborators, and to keep CLI dispatch (main.rs) separate from logic.
//!
//! ## Architecture
//!
//! - **Core Logic**: `core` holds the exposure transition controller, a pure
//!   function of the clock, the sun times and the persisted state
//! - **Sun Times**: `sun` loads and generates the per-date sunrise/sunset table
//! - **State**: `state` persists shutter speed, gain and counters between runs
//! - **Configuration**: `config` for TOML-based settings with validation
//! - **Commands**: `commands` for CLI subcommands (run, status, reset, simulate, suntable)
//! - **Infrastructure**: logging, the swappable clock in `time_source`, shared constants

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod commands;
pub mod common;
pub mod config;
pub mod core;
pub mod state;
pub mod sun;
pub mod time_source;

pub use crate::core::{CaptureParams, ExposureDecision, ExposureSettings, compute_next_exposure};
pub use crate::state::{ExposureState, LoadOutcome, StateStore};
pub use crate::sun::{SunTable, SunTimes, SunTimesProvider};
