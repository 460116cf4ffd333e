//! Offline generation of the yearly sun table.
//!
//! Sunrise and sunset are computed with the `sunrise` crate for every day of
//! the requested year and converted to local clock time, either in an explicit
//! IANA zone or the system zone. Days on which the sun never crosses the
//! horizon are written as sentinels so high-latitude rigs keep working through
//! the midnight sun and the polar night.

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use sunrise::{Coordinates, SolarDay, SolarEvent};

use super::{SunEvent, SunTable, SunTimes};

/// Standard altitude of the sun's centre at sunrise/sunset, in degrees
const HORIZON_ALTITUDE: f64 = -0.833;
/// Margin on the hour-angle cosine; days this close to the polar boundary have
/// under half an hour of daylight (or darkness) and are treated as polar
const POLAR_MARGIN: f64 = 1e-3;

/// Parameters for building a table.
#[derive(Debug, Clone)]
pub struct TableRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub year: i32,
    /// Zone for local clock times; `None` uses the system zone
    pub timezone: Option<Tz>,
}

/// Build a sun table covering every day of `request.year`.
///
/// Non-leap years also get a `02-29` entry copied from `02-28`, so the table
/// keeps covering every date when reused in a leap year.
pub fn generate_table(request: &TableRequest) -> Result<SunTable> {
    let coord = Coordinates::new(request.latitude, request.longitude).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid coordinates: lat={:.4}, lon={:.4}",
            request.latitude,
            request.longitude
        )
    })?;

    let first = NaiveDate::from_ymd_opt(request.year, 1, 1)
        .ok_or_else(|| anyhow::anyhow!("Invalid year {}", request.year))?;

    let mut table = SunTable::new();
    for date in first.iter_days().take_while(|d| d.year() == request.year) {
        let times = match polar_condition(request.latitude, date) {
            Some(sentinel) => SunTimes {
                sunrise: sentinel,
                sunset: sentinel,
            },
            None => solar_times(coord, date, request.timezone),
        };
        table.insert(date, times);
    }

    if !first.leap_year() {
        table.copy_entry("02-28", "02-29");
    }

    Ok(table)
}

/// Detect polar day or polar night from the sunrise hour-angle equation.
///
/// Returns `Some(NeverSets)` when the sun stays up, `Some(NeverRises)` when it
/// stays down, and `None` on ordinary days.
pub(crate) fn polar_condition(latitude: f64, date: NaiveDate) -> Option<SunEvent> {
    let lat = latitude.to_radians();
    let declination = solar_declination(date).to_radians();
    let numerator = HORIZON_ALTITUDE.to_radians().sin() - lat.sin() * declination.sin();
    let denominator = lat.cos() * declination.cos();

    let cos_hour_angle = if denominator.abs() < f64::EPSILON {
        // At the poles the sign of the numerator alone decides
        numerator.signum() * f64::INFINITY
    } else {
        numerator / denominator
    };

    if cos_hour_angle > 1.0 - POLAR_MARGIN {
        Some(SunEvent::NeverRises)
    } else if cos_hour_angle < -1.0 + POLAR_MARGIN {
        Some(SunEvent::NeverSets)
    } else {
        None
    }
}

/// Sun times from the solar calculation, falling back to sentinels when the
/// computed day length degenerates to zero or a full day.
fn solar_times(coord: Coordinates, date: NaiveDate, timezone: Option<Tz>) -> SunTimes {
    let solar_day = SolarDay::new(coord, date);
    let rise = solar_day.event_time(SolarEvent::Sunrise);
    let set = solar_day.event_time(SolarEvent::Sunset);
    let daylight = set - rise;

    if daylight <= Duration::minutes(1) {
        SunTimes {
            sunrise: SunEvent::NeverRises,
            sunset: SunEvent::NeverRises,
        }
    } else if daylight >= Duration::hours(24) - Duration::minutes(1) {
        SunTimes {
            sunrise: SunEvent::NeverSets,
            sunset: SunEvent::NeverSets,
        }
    } else {
        SunTimes::new(to_local_clock(rise, timezone), to_local_clock(set, timezone))
    }
}

/// Approximate solar declination in degrees for a date.
fn solar_declination(date: NaiveDate) -> f64 {
    let day_of_year = date.ordinal() as f64;
    -23.44 * ((360.0 / 365.0) * (day_of_year + 10.0)).to_radians().cos()
}

/// Convert a UTC event to a local clock time truncated to the minute.
fn to_local_clock(event: DateTime<Utc>, timezone: Option<Tz>) -> NaiveTime {
    let time = match timezone {
        Some(tz) => event.with_timezone(&tz).time(),
        None => event.with_timezone(&Local).time(),
    };
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}
