//! The yearly sun table stored as JSON.
//!
//! ```json
//! {
//!     "03-21": { "sunrise": "06:02", "sunset": "18:14" },
//!     "06-21": { "sunrise": "never_sets", "sunset": "never_sets" }
//! }
//! ```
//!
//! Tables fetched from sunrise-sunset.org carry full timestamps and a
//! `solar_noon` field; both are accepted and the noon value is kept verbatim.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{SunEvent, SunTimes, SunTimesProvider, date_key};
use crate::common::utils::private_path;

/// On-disk shape of one table entry.
#[derive(Debug, Serialize, Deserialize)]
struct RawEntry {
    sunrise: String,
    sunset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    solar_noon: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct DayEntry {
    times: SunTimes,
    solar_noon: Option<String>,
}

/// Sun times for every day of a year, keyed by `MM-DD`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SunTable {
    entries: BTreeMap<String, DayEntry>,
}

impl SunTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read sun table from {}", private_path(path)))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse sun table {}", private_path(path)))
    }

    /// Parse a table from JSON, rejecting malformed keys and times.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawEntry> =
            serde_json::from_str(content).context("Sun table is not a JSON object of days")?;

        let mut table = Self::new();
        for (key, entry) in raw {
            validate_key(&key)?;
            let sunrise: SunEvent = entry
                .sunrise
                .parse()
                .with_context(|| format!("Invalid sunrise for {key}"))?;
            let sunset: SunEvent = entry
                .sunset
                .parse()
                .with_context(|| format!("Invalid sunset for {key}"))?;
            table.entries.insert(
                key,
                DayEntry {
                    times: SunTimes { sunrise, sunset },
                    solar_noon: entry.solar_noon,
                },
            );
        }
        Ok(table)
    }

    /// Serialize the table as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        let raw: BTreeMap<&str, RawEntry> = self
            .entries
            .iter()
            .map(|(key, entry)| {
                (
                    key.as_str(),
                    RawEntry {
                        sunrise: entry.times.sunrise.to_string(),
                        sunset: entry.times.sunset.to_string(),
                        solar_noon: entry.solar_noon.clone(),
                    },
                )
            })
            .collect();
        serde_json::to_string_pretty(&raw).context("Failed to serialize sun table")
    }

    /// Write the table to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create directory {}", private_path(parent))
            })?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write sun table to {}", private_path(path)))
    }

    /// Set the entry for `date`, replacing any previous one.
    pub fn insert(&mut self, date: NaiveDate, times: SunTimes) {
        self.entries.insert(
            date_key(date),
            DayEntry {
                times,
                solar_noon: None,
            },
        );
    }

    /// Copy an existing entry to another key. Returns false if `from` is absent.
    pub(crate) fn copy_entry(&mut self, from: &str, to: &str) -> bool {
        match self.entries.get(from).cloned() {
            Some(entry) => {
                self.entries.insert(to.to_string(), entry);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that carry a polar sentinel.
    pub fn polar_days(&self) -> usize {
        self.entries.values().filter(|e| e.times.is_polar()).count()
    }
}

impl SunTimesProvider for SunTable {
    fn sun_times(&self, date: NaiveDate) -> Option<SunTimes> {
        self.entries.get(&date_key(date)).map(|entry| entry.times)
    }
}

/// Keys must name a real month-day (Feb 29 included).
fn validate_key(key: &str) -> Result<()> {
    if key.len() != 5 {
        anyhow::bail!("Invalid sun table key '{key}'. Use MM-DD");
    }
    NaiveDate::parse_from_str(&format!("2024-{key}"), "%Y-%m-%d")
        .map(|_| ())
        .with_context(|| format!("Invalid sun table key '{key}'. Use MM-DD"))
}
