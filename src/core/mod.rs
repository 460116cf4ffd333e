//! Exposure transition controller.
//!
//! Given the wall-clock time, the sun times around it and the persisted
//! state, decide the shutter speed and gain for the next capture and the
//! state to persist. The decision itself ([`compute_next_exposure`]) is a
//! pure function; [`run_cycle`] wraps it with the load/save round trip a
//! single invocation performs.
//!
//! There is no stored mode flag. Each call re-derives the [`Phase`] from
//! `now`:
//!
//! - **Day**, **Polar**, **Unknown**: daytime defaults, counter reset
//! - **PostSunset**: one [`ramp::ramp_up`] step
//! - **PreSunrise**: one [`ramp::ramp_down`] step
//! - **Night**: prior values held
//!
//! Prior values are pulled into the configured bounds before any of this, so
//! every returned state satisfies
//! `daytime_shutter <= shutter_speed <= max_shutter` and
//! `min_gain <= gain <= max_gain`.

pub mod phase;
pub mod ramp;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use crate::common::constants::*;
use crate::common::utils::format_shutter;
use crate::state::{DefaultReason, ExposureState, StateStore};
use crate::sun::SunTimesProvider;

pub use phase::{Phase, detect_phase};

/// Read-only controller parameters, resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureSettings {
    /// Daytime shutter speed and lower shutter bound, in microseconds
    pub daytime_shutter: u64,
    /// Upper shutter bound, in microseconds
    pub max_shutter: u64,
    /// Lower gain bound, `max(1.0, daytime_gain)`
    pub min_gain: f64,
    pub max_gain: f64,
    /// Captures expected to span a full ramp
    pub ramp_steps: u32,
    /// Start of the sunrise ramp relative to sunrise (negative)
    pub sunrise_offset_minutes: i64,
    /// Length of the ramp after sunset
    pub sunset_window_minutes: u64,
}

impl Default for ExposureSettings {
    fn default() -> Self {
        Self {
            daytime_shutter: DEFAULT_DAYTIME_SHUTTER,
            max_shutter: DEFAULT_MAX_SHUTTER,
            min_gain: DEFAULT_DAYTIME_GAIN.max(GAIN_FLOOR),
            max_gain: DEFAULT_MAX_GAIN,
            ramp_steps: DEFAULT_RAMP_STEPS,
            sunrise_offset_minutes: DEFAULT_SUNRISE_OFFSET_MINUTES,
            sunset_window_minutes: DEFAULT_SUNSET_WINDOW_MINUTES,
        }
    }
}

impl ExposureSettings {
    /// Whole microseconds added or removed per ramp step (floor division).
    pub fn shutter_increment(&self) -> u64 {
        self.max_shutter.saturating_sub(self.daytime_shutter) / u64::from(self.ramp_steps.max(1))
    }

    /// Gain added or removed per ramp step, usually fractional.
    pub fn gain_increment(&self) -> f64 {
        (self.max_gain - self.min_gain).max(0.0) / f64::from(self.ramp_steps.max(1))
    }
}

/// Values handed to the camera for the next capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CaptureParams {
    /// Microseconds
    pub shutter_speed: u64,
    pub gain: f64,
}

impl fmt::Display for CaptureParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shutter {} ({} µs), gain {:.2}",
            format_shutter(self.shutter_speed),
            self.shutter_speed,
            self.gain
        )
    }
}

/// Outcome of one controller step.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureDecision {
    pub phase: Phase,
    pub next_state: ExposureState,
    pub capture: CaptureParams,
}

/// Decide the exposure for a capture at `now`.
pub fn compute_next_exposure(
    now: NaiveDateTime,
    state: &ExposureState,
    sun: &impl SunTimesProvider,
    settings: &ExposureSettings,
) -> ExposureDecision {
    let phase = detect_phase(now, sun, settings);

    let mut next_state = if phase.uses_daytime_defaults() {
        ExposureState::daytime(settings)
    } else {
        let prior = ramp::clamp_into_bounds(state, settings);
        match phase {
            Phase::PostSunset => ramp::ramp_up(&prior, settings),
            Phase::PreSunrise => ramp::ramp_down(&prior, settings),
            _ => prior,
        }
    };
    next_state.photo_counter = next_state.photo_counter.saturating_add(1);

    let capture = CaptureParams {
        shutter_speed: next_state.shutter_speed,
        gain: next_state.gain,
    };

    ExposureDecision {
        phase,
        next_state,
        capture,
    }
}

/// Everything one invocation did, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub now: NaiveDateTime,
    pub previous: ExposureState,
    /// Set when the store fell back to defaults
    pub defaulted: Option<DefaultReason>,
    pub decision: ExposureDecision,
    pub saved: bool,
}

/// Load, decide, and (when `persist` is set) save.
///
/// A missing or corrupt state file is not an error here; only a failed save
/// is.
pub fn run_cycle(
    now: NaiveDateTime,
    store: &impl StateStore,
    sun: &impl SunTimesProvider,
    settings: &ExposureSettings,
    persist: bool,
) -> Result<CycleReport> {
    let outcome = store.load();
    let defaulted = outcome.default_reason().cloned();
    let previous = outcome.into_state();

    let decision = compute_next_exposure(now, &previous, sun, settings);

    if persist {
        store
            .save(&decision.next_state)
            .context("Failed to persist exposure state")?;
    }

    Ok(CycleReport {
        now,
        previous,
        defaulted,
        decision,
        saved: persist,
    })
}

/// Log a cycle in the block style used by every command.
pub fn log_cycle_report(report: &CycleReport, debug_enabled: bool) {
    if let Some(reason) = &report.defaulted {
        match reason {
            DefaultReason::Missing => {
                log_indented!("No saved state, starting from daytime values");
            }
            DefaultReason::Unreadable(_) | DefaultReason::Corrupt(_) => {
                log_warning!("Ignoring saved state ({reason}), starting from daytime values");
            }
        }
    }

    let decision = &report.decision;
    log_block_start!(
        "{}{} at {}",
        decision.phase.symbol(),
        decision.phase.display_name(),
        report.now.format("%Y-%m-%d %H:%M:%S")
    );
    log_indented!("Capture: {}", decision.capture);
    if debug_enabled {
        log_debug!(
            "Gain carry: {:.4} -> {:.4}",
            report.previous.gain_increment_counter,
            decision.next_state.gain_increment_counter
        );
        log_debug!("Photo counter: {}", decision.next_state.photo_counter);
    }

    if !report.saved {
        log_indented!("Dry run: state not saved");
    }
}
