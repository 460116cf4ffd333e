//! Default values, hard limits, and process exit codes.
//!
//! Defaults mirror a Raspberry Pi HQ camera timelapse rig: a fast daytime
//! shutter, a twelve second night exposure, and analog gain up to 8x.

// # Exposure defaults

/// Daytime shutter speed in microseconds
pub const DEFAULT_DAYTIME_SHUTTER: u64 = 4489;
/// Full-night shutter speed in microseconds
pub const DEFAULT_MAX_SHUTTER: u64 = 12_000_000;
/// Daytime analog gain; the effective minimum is never below 1.0
pub const DEFAULT_DAYTIME_GAIN: f64 = 0.0;
/// Full-night analog gain
pub const DEFAULT_MAX_GAIN: f64 = 8.0;
/// Captures needed to ramp from daytime to full-night values
pub const DEFAULT_RAMP_STEPS: u32 = 60;
/// Pre-sunrise ramp starts this many minutes relative to sunrise (negative)
pub const DEFAULT_SUNRISE_OFFSET_MINUTES: i64 = -60;
/// Length of the post-sunset ramp window in minutes
pub const DEFAULT_SUNSET_WINDOW_MINUTES: u64 = 120;
/// Seconds between captures, used when simulating a schedule
pub const DEFAULT_CAPTURE_INTERVAL: u64 = 60;

/// Analog gain floor regardless of configured daytime gain
pub const GAIN_FLOOR: f64 = 1.0;

// # File defaults

pub const CONFIG_FILE_NAME: &str = "duskcam.toml";
pub const DEFAULT_SUN_TABLE: &str = "sun_data.json";
pub const STATE_FILE_NAME: &str = "camera_state.json";

// # Sun table sentinels

pub const NEVER_RISES: &str = "never_rises";
pub const NEVER_SETS: &str = "never_sets";

// # Validation limits

pub const MINIMUM_SHUTTER: u64 = 1;
pub const MAXIMUM_SHUTTER: u64 = 1_000_000_000;
pub const MAXIMUM_GAIN: f64 = 64.0;
pub const MINIMUM_RAMP_STEPS: u32 = 1;
pub const MAXIMUM_RAMP_STEPS: u32 = 10_000;
pub const MINIMUM_SUNRISE_OFFSET: i64 = -720;
pub const MAXIMUM_SUNRISE_OFFSET: i64 = -1;
pub const MINIMUM_SUNSET_WINDOW: u64 = 1;
pub const MAXIMUM_SUNSET_WINDOW: u64 = 720;
pub const MINIMUM_CAPTURE_INTERVAL: u64 = 1;
pub const MAXIMUM_CAPTURE_INTERVAL: u64 = 86_400;
pub const MINUTES_PER_DAY: u64 = 1440;

// # Exit codes

pub const EXIT_FAILURE: i32 = 1;

/// Constants shared by unit tests across modules.
#[cfg(test)]
pub mod test_constants {
    pub const TEST_SUNRISE: &str = "06:30";
    pub const TEST_SUNSET: &str = "19:45";
}
