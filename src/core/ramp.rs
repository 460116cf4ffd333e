//! Per-capture exposure steps.
//!
//! Shutter speed moves by a whole number of microseconds each capture. Gain
//! moves in whole units only: the per-capture gain increment is usually a
//! fraction, so it accumulates in `gain_increment_counter` and whole units are
//! transferred into `gain` once the carry reaches one. The counter is the
//! only carry; gain stays integral-valued for the camera.

use super::ExposureSettings;
use crate::state::ExposureState;

/// Summed float increments can fall a hair short of a whole unit
const CARRY_TOLERANCE: f64 = 1e-9;

/// One post-sunset step: brighter exposure, bounded by the configured maxima.
pub fn ramp_up(state: &ExposureState, settings: &ExposureSettings) -> ExposureState {
    let shutter_speed = state
        .shutter_speed
        .saturating_add(settings.shutter_increment())
        .min(settings.max_shutter);

    let mut gain = state.gain;
    let mut counter = state.gain_increment_counter + settings.gain_increment();
    if counter >= 1.0 - CARRY_TOLERANCE {
        let whole = (counter + CARRY_TOLERANCE).trunc();
        gain += whole;
        counter -= whole;
    }

    ExposureState {
        shutter_speed,
        gain: gain.min(settings.max_gain),
        photo_counter: state.photo_counter,
        gain_increment_counter: counter,
    }
}

/// One pre-sunrise step: darker exposure, bounded by the daytime minima.
pub fn ramp_down(state: &ExposureState, settings: &ExposureSettings) -> ExposureState {
    let shutter_speed = state
        .shutter_speed
        .saturating_sub(settings.shutter_increment())
        .max(settings.daytime_shutter);

    let mut gain = state.gain;
    let mut counter = state.gain_increment_counter - settings.gain_increment();
    if counter <= -1.0 + CARRY_TOLERANCE {
        let whole = (counter - CARRY_TOLERANCE).trunc();
        gain += whole;
        counter -= whole;
    }

    ExposureState {
        shutter_speed,
        gain: gain.max(settings.min_gain),
        photo_counter: state.photo_counter,
        gain_increment_counter: counter,
    }
}

/// Pull a loaded state back inside the configured bounds.
///
/// Values written under an older configuration may lie outside the current
/// one; the counter is kept inside `(-1, 1)`.
pub fn clamp_into_bounds(state: &ExposureState, settings: &ExposureSettings) -> ExposureState {
    let counter = if state.gain_increment_counter.is_finite() {
        state.gain_increment_counter.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    ExposureState {
        shutter_speed: state
            .shutter_speed
            .min(settings.max_shutter)
            .max(settings.daytime_shutter),
        gain: state.gain.min(settings.max_gain).max(settings.min_gain),
        photo_counter: state.photo_counter,
        gain_increment_counter: counter.fract(),
    }
}
