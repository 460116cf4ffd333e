//! Sun times provider: per-date sunrise and sunset clock times.
//!
//! Times come from a precomputed yearly table keyed by `MM-DD` (see
//! [`table::SunTable`]), which can be produced offline with
//! [`generate::generate_table`]. Values are local wall-clock times without
//! zone information; the controller compares them directly against the local
//! clock.
//!
//! Dates with no sunrise or sunset at all (polar day or polar night) carry a
//! sentinel instead of a time. A date missing from the table is not an error:
//! the provider returns `None` and the controller falls back to daytime.

pub mod generate;
pub mod table;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use std::fmt;
use std::str::FromStr;

use crate::common::constants::{NEVER_RISES, NEVER_SETS};

pub use generate::{TableRequest, generate_table};
pub use table::SunTable;

/// A sunrise or sunset entry for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunEvent {
    /// The event happens at this local clock time
    At(NaiveTime),
    /// Polar night: the sun stays below the horizon all day
    NeverRises,
    /// Polar day: the sun stays above the horizon all day
    NeverSets,
}

impl SunEvent {
    /// Clock time of the event, or `None` for a sentinel.
    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            SunEvent::At(time) => Some(*time),
            SunEvent::NeverRises | SunEvent::NeverSets => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.time().is_none()
    }
}

impl FromStr for SunEvent {
    type Err = anyhow::Error;

    /// Accepts `HH:MM`, `HH:MM:SS`, `H:MM:SS AM`, an RFC 3339 timestamp, or a
    /// sentinel. Timestamps keep the time of day exactly as written.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s {
            NEVER_RISES => return Ok(SunEvent::NeverRises),
            NEVER_SETS => return Ok(SunEvent::NeverSets),
            _ => {}
        }

        if let Ok(time) = NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .or_else(|_| NaiveTime::parse_from_str(s, "%I:%M:%S %p"))
        {
            return Ok(SunEvent::At(time));
        }

        DateTime::parse_from_rfc3339(s)
            .map(|dt| SunEvent::At(dt.naive_local().time()))
            .with_context(|| {
                format!("Invalid sun time '{s}'. Use HH:MM, an RFC 3339 timestamp, '{NEVER_RISES}' or '{NEVER_SETS}'")
            })
    }
}

impl fmt::Display for SunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SunEvent::At(time) if time.second() == 0 => write!(f, "{}", time.format("%H:%M")),
            SunEvent::At(time) => write!(f, "{}", time.format("%H:%M:%S")),
            SunEvent::NeverRises => f.write_str(NEVER_RISES),
            SunEvent::NeverSets => f.write_str(NEVER_SETS),
        }
    }
}

/// Sunrise and sunset for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunTimes {
    pub sunrise: SunEvent,
    pub sunset: SunEvent,
}

impl SunTimes {
    pub fn new(sunrise: NaiveTime, sunset: NaiveTime) -> Self {
        Self {
            sunrise: SunEvent::At(sunrise),
            sunset: SunEvent::At(sunset),
        }
    }

    /// Both clock times, or `None` if either entry is a sentinel.
    pub fn clock_times(&self) -> Option<(NaiveTime, NaiveTime)> {
        Some((self.sunrise.time()?, self.sunset.time()?))
    }

    pub fn is_polar(&self) -> bool {
        self.sunrise.is_sentinel() || self.sunset.is_sentinel()
    }
}

/// Lookup of sun times by calendar date.
#[cfg_attr(test, mockall::automock)]
pub trait SunTimesProvider {
    /// Sun times for `date`, or `None` when the date is not covered.
    fn sun_times(&self, date: NaiveDate) -> Option<SunTimes>;
}

/// Table key for a date, e.g. `03-21`.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%m-%d").to_string()
}

#[cfg(test)]
mod tests;
