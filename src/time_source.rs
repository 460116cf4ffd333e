//! Time source abstraction for supporting real, pinned, and simulated clocks.
//!
//! The controller never reads the clock itself; commands ask this module for
//! "now" and pass it down. Swapping the global source lets `run --at` pin the
//! clock to a given wall time and lets `simulate` fast-forward through a night
//! while the logger stamps every line with the simulated time.
//!
//! All times are naive local wall-clock times, matching the sun table which
//! stores local clock times without zone information.

use chrono::{Duration, Local, NaiveDateTime};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, PoisonError};

/// Global time source instance, defaults to RealTimeSource
static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current local wall-clock time
    fn now(&self) -> NaiveDateTime;

    /// Check if this source differs from the real system clock
    fn is_simulated(&self) -> bool;

    /// Check if simulation has ended (always false for real time)
    fn is_ended(&self) -> bool {
        false
    }
}

/// Real-time implementation that uses actual system time
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// A clock frozen at a single instant, used by `run --at`.
pub struct FixedTimeSource {
    instant: NaiveDateTime,
}

impl FixedTimeSource {
    pub fn new(instant: NaiveDateTime) -> Self {
        Self { instant }
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> NaiveDateTime {
        self.instant
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Fast-forward clock for the `simulate` command.
///
/// Time only moves when [`SimulatedTimeSource::advance`] is called, and never
/// past the configured end time.
pub struct SimulatedTimeSource {
    end_time: NaiveDateTime,
    current: Mutex<NaiveDateTime>,
}

impl SimulatedTimeSource {
    pub fn new(start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        Self {
            end_time,
            current: Mutex::new(start_time.min(end_time)),
        }
    }

    /// Move the simulated clock forward, capped at the end time.
    pub fn advance(&self, step: Duration) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = (*current + step).min(self.end_time);
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> NaiveDateTime {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.now() >= self.end_time
    }
}

/// Initialize the global time source (call once at startup)
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

/// Check if the time source has been initialized
pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

/// Get the current time from the global time source
pub fn now() -> NaiveDateTime {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).now()
}

/// Check if we're running on a pinned or simulated clock
pub fn is_simulated() -> bool {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .is_simulated()
}

/// Parse a local datetime in the format "YYYY-MM-DD HH:MM:SS" or "YYYY-MM-DD HH:MM"
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
        .map_err(|e| format!("Invalid datetime '{s}': {e}. Use YYYY-MM-DD HH:MM[:SS]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_simulated_source_caps_at_end() {
        let source = SimulatedTimeSource::new(at(18, 0), at(18, 30));
        source.advance(Duration::minutes(20));
        assert_eq!(source.now(), at(18, 20));
        assert!(!source.is_ended());

        source.advance(Duration::minutes(20));
        assert_eq!(source.now(), at(18, 30));
        assert!(source.is_ended());
    }

    #[test]
    fn test_fixed_source_never_moves() {
        let source = FixedTimeSource::new(at(5, 15));
        assert_eq!(source.now(), at(5, 15));
        assert!(source.is_simulated());
        assert!(!source.is_ended());
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert_eq!(parse_datetime("2024-03-01 18:30").unwrap(), at(18, 30));
        assert_eq!(parse_datetime("2024-03-01 18:30:00").unwrap(), at(18, 30));
        assert!(parse_datetime("18:30").is_err());
        assert!(parse_datetime("2024-13-01 18:30").is_err());
    }
}
