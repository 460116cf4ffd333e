//! Phase derivation from the wall clock and the sun table.
//!
//! The phase is never stored. Every invocation recomputes it from `now`, so a
//! missed capture, a reboot, or a clock change cannot leave a stale phase
//! behind. Windows that cross midnight are found by looking at yesterday's
//! sunset and tomorrow's sunrise as well as today's.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::ExposureSettings;
use crate::sun::{SunTimes, SunTimesProvider};

/// Where in the day/night cycle a capture falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Between sunrise and sunset: daytime values
    Day,
    /// Within the ramp window after sunset: exposure increases
    PostSunset,
    /// After the sunset ramp and before the sunrise ramp: values held
    Night,
    /// Within the window ending at sunrise: exposure decreases
    PreSunrise,
    /// Today has no sunrise or sunset (polar day or night): daytime values
    Polar,
    /// No sun times for today: daytime values
    Unknown,
}

impl Phase {
    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Day => "Day",
            Phase::PostSunset => "Sunset ramp",
            Phase::Night => "Night",
            Phase::PreSunrise => "Sunrise ramp",
            Phase::Polar => "Polar day/night",
            Phase::Unknown => "Unknown sun times",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Phase::Day => "󰖨 ",
            Phase::PostSunset => "󰖛 ",
            Phase::Night => " ",
            Phase::PreSunrise => "󰖜 ",
            Phase::Polar => "󰖙 ",
            Phase::Unknown => "? ",
        }
    }

    /// Phases that use the daytime defaults instead of the persisted values.
    pub fn uses_daytime_defaults(&self) -> bool {
        matches!(self, Phase::Day | Phase::Polar | Phase::Unknown)
    }

    pub fn is_ramping(&self) -> bool {
        matches!(self, Phase::PostSunset | Phase::PreSunrise)
    }
}

/// Absolute sunrise and sunset instants for one table day.
struct DayBounds {
    sunrise: NaiveDateTime,
    sunset: NaiveDateTime,
}

impl DayBounds {
    /// `None` for polar days. A sunset at or before sunrise on the clock
    /// belongs to the following calendar day.
    fn for_date(date: NaiveDate, times: &SunTimes) -> Option<Self> {
        let (sunrise, sunset) = times.clock_times()?;
        let sunrise = date.and_time(sunrise);
        let mut sunset = date.and_time(sunset);
        if sunset <= sunrise {
            sunset += Duration::days(1);
        }
        Some(Self { sunrise, sunset })
    }
}

/// Determine the phase for a capture at `now`.
///
/// Precedence when windows overlap: pre-sunrise, then post-sunset, then day.
pub fn detect_phase(
    now: NaiveDateTime,
    sun: &impl SunTimesProvider,
    settings: &ExposureSettings,
) -> Phase {
    let today = now.date();
    let Some(today_times) = sun.sun_times(today) else {
        return Phase::Unknown;
    };
    if today_times.is_polar() {
        return Phase::Polar;
    }

    let days: Vec<DayBounds> = [today.pred_opt(), Some(today), today.succ_opt()]
        .into_iter()
        .flatten()
        .filter_map(|date| {
            let times = if date == today {
                today_times
            } else {
                sun.sun_times(date)?
            };
            DayBounds::for_date(date, &times)
        })
        .collect();

    let sunrise_offset = Duration::minutes(settings.sunrise_offset_minutes);
    let sunset_window = Duration::minutes(settings.sunset_window_minutes as i64);

    if days
        .iter()
        .any(|d| d.sunrise + sunrise_offset <= now && now < d.sunrise)
    {
        return Phase::PreSunrise;
    }

    if days
        .iter()
        .any(|d| d.sunset < now && now <= d.sunset + sunset_window)
    {
        return Phase::PostSunset;
    }

    if days.iter().any(|d| d.sunrise <= now && now <= d.sunset) {
        return Phase::Day;
    }

    Phase::Night
}
