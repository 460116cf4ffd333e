//! Configuration validation functionality.
//!
//! Rejects values the controller cannot work with (empty ranges, windows
//! that cover the whole day) and warns about ones that work but probably
//! aren't what the user meant.

use anyhow::Result;

use super::Config;
use crate::common::constants::*;

/// Validate every configured field, using defaults for the missing ones
/// when a rule spans several fields.
pub fn validate_config(config: &Config) -> Result<()> {
    // 1. Shutter bounds
    let daytime_shutter = config.daytime_shutter.unwrap_or(DEFAULT_DAYTIME_SHUTTER);
    let max_shutter = config.max_shutter.unwrap_or(DEFAULT_MAX_SHUTTER);

    for (name, value) in [
        ("daytime_shutter", daytime_shutter),
        ("max_shutter", max_shutter),
    ] {
        if !(MINIMUM_SHUTTER..=MAXIMUM_SHUTTER).contains(&value) {
            anyhow::bail!(
                "{} ({} µs) must be between {} and {} microseconds",
                name,
                value,
                MINIMUM_SHUTTER,
                MAXIMUM_SHUTTER
            );
        }
    }

    if daytime_shutter >= max_shutter {
        anyhow::bail!(
            "daytime_shutter ({} µs) must be shorter than max_shutter ({} µs)",
            daytime_shutter,
            max_shutter
        );
    }

    // 2. Gain bounds
    let daytime_gain = config.daytime_gain.unwrap_or(DEFAULT_DAYTIME_GAIN);
    if !daytime_gain.is_finite() || !(0.0..=MAXIMUM_GAIN).contains(&daytime_gain) {
        anyhow::bail!(
            "daytime_gain ({}) must be between 0 and {}",
            daytime_gain,
            MAXIMUM_GAIN
        );
    }

    let max_gain = config.max_gain.unwrap_or(DEFAULT_MAX_GAIN);
    if !max_gain.is_finite() || !(GAIN_FLOOR..=MAXIMUM_GAIN).contains(&max_gain) {
        anyhow::bail!(
            "max_gain ({}) must be between {} and {}",
            max_gain,
            GAIN_FLOOR,
            MAXIMUM_GAIN
        );
    }

    let min_gain = daytime_gain.max(GAIN_FLOOR);
    if max_gain <= min_gain {
        anyhow::bail!(
            "max_gain ({}) must be greater than the daytime gain ({}). \
            Gain is never set below {} even when daytime_gain is lower.",
            max_gain,
            min_gain,
            GAIN_FLOOR
        );
    }

    // 3. Ramp shape
    if let Some(steps) = config.ramp_steps
        && !(MINIMUM_RAMP_STEPS..=MAXIMUM_RAMP_STEPS).contains(&steps)
    {
        anyhow::bail!(
            "ramp_steps ({}) must be between {} and {}",
            steps,
            MINIMUM_RAMP_STEPS,
            MAXIMUM_RAMP_STEPS
        );
    }

    let sunrise_offset = config
        .sunrise_offset_minutes
        .unwrap_or(DEFAULT_SUNRISE_OFFSET_MINUTES);
    if !(MINIMUM_SUNRISE_OFFSET..=MAXIMUM_SUNRISE_OFFSET).contains(&sunrise_offset) {
        anyhow::bail!(
            "sunrise_offset_minutes ({}) must be between {} and {}. \
            The sunrise ramp ends at sunrise, so the offset is negative.",
            sunrise_offset,
            MINIMUM_SUNRISE_OFFSET,
            MAXIMUM_SUNRISE_OFFSET
        );
    }

    let sunset_window = config
        .sunset_window_minutes
        .unwrap_or(DEFAULT_SUNSET_WINDOW_MINUTES);
    if !(MINIMUM_SUNSET_WINDOW..=MAXIMUM_SUNSET_WINDOW).contains(&sunset_window) {
        anyhow::bail!(
            "sunset_window_minutes ({}) must be between {} and {} minutes",
            sunset_window,
            MINIMUM_SUNSET_WINDOW,
            MAXIMUM_SUNSET_WINDOW
        );
    }

    if sunset_window + sunrise_offset.unsigned_abs() >= MINUTES_PER_DAY {
        anyhow::bail!(
            "Transition windows cover the whole day: sunset_window_minutes ({}) \
            plus the sunrise offset ({} minutes) must be less than {} minutes",
            sunset_window,
            sunrise_offset.unsigned_abs(),
            MINUTES_PER_DAY
        );
    }

    let capture_interval = config.capture_interval.unwrap_or(DEFAULT_CAPTURE_INTERVAL);
    if !(MINIMUM_CAPTURE_INTERVAL..=MAXIMUM_CAPTURE_INTERVAL).contains(&capture_interval) {
        anyhow::bail!(
            "capture_interval ({} seconds) must be between {} and {} seconds",
            capture_interval,
            MINIMUM_CAPTURE_INTERVAL,
            MAXIMUM_CAPTURE_INTERVAL
        );
    }

    // 4. Location, only needed for table generation
    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    config.timezone()?;

    // 5. A ramp longer than its window never reaches full-night values
    let steps = config.ramp_steps.unwrap_or(DEFAULT_RAMP_STEPS);
    let ramp_minutes = u64::from(steps) * capture_interval / 60;
    if ramp_minutes > sunset_window {
        log_warning!(
            "A full ramp takes {ramp_minutes} minutes ({steps} steps every {capture_interval} seconds) but the sunset window is {sunset_window} minutes. Night values will not be reached."
        );
    }

    Ok(())
}
