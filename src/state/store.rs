//! State store implementations: a JSON file for real runs, memory for simulation.

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::{DefaultReason, ExposureState, LoadOutcome, StateStore};
use crate::common::utils::private_path;

/// Exposure state kept in a flat JSON document.
///
/// ```json
/// {
///   "shutter_speed": 204414,
///   "gain": 1.0,
///   "photo_counter": 1,
///   "gain_increment_counter": 0.11666666666666667
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
    defaults: ExposureState,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>, defaults: ExposureState) -> Self {
        Self {
            path: path.into(),
            defaults,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn defaulted(&self, reason: DefaultReason) -> LoadOutcome {
        LoadOutcome::Defaulted {
            state: self.defaults.clone(),
            reason,
        }
    }
}

/// Parse and validate a state document.
pub(crate) fn parse_state(content: &str) -> Result<ExposureState> {
    let state: ExposureState = serde_json::from_str(content)?;
    state.validate()?;
    Ok(state)
}

impl StateStore for JsonStateStore {
    fn load(&self) -> LoadOutcome {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return self.defaulted(DefaultReason::Missing);
            }
            Err(e) => return self.defaulted(DefaultReason::Unreadable(e.to_string())),
        };

        match parse_state(&content) {
            Ok(state) => LoadOutcome::Loaded(state),
            Err(e) => self.defaulted(DefaultReason::Corrupt(format!("{e:#}"))),
        }
    }

    /// Write to a temporary file beside the target and rename it into place,
    /// so a killed process leaves either the old record or the new one.
    fn save(&self, state: &ExposureState) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create state directory {}", private_path(&dir)))?;

        let json = serde_json::to_string_pretty(state).context("Failed to serialize state")?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temp file in {}", private_path(&dir)))?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;
        tmp.persist(&self.path).with_context(|| {
            format!("Failed to write state to {}", private_path(&self.path))
        })?;
        Ok(())
    }
}

/// In-process store used by `simulate`; starts empty (cold start).
#[derive(Debug)]
pub struct MemoryStateStore {
    saved: RefCell<Option<ExposureState>>,
    defaults: ExposureState,
}

impl MemoryStateStore {
    pub fn new(defaults: ExposureState) -> Self {
        Self {
            saved: RefCell::new(None),
            defaults,
        }
    }

    /// Pre-seed the store as if `state` had been saved.
    pub fn with_state(defaults: ExposureState, state: ExposureState) -> Self {
        Self {
            saved: RefCell::new(Some(state)),
            defaults,
        }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> LoadOutcome {
        match self.saved.borrow().as_ref() {
            Some(state) => LoadOutcome::Loaded(state.clone()),
            None => LoadOutcome::Defaulted {
                state: self.defaults.clone(),
                reason: DefaultReason::Missing,
            },
        }
    }

    fn save(&self, state: &ExposureState) -> Result<()> {
        *self.saved.borrow_mut() = Some(state.clone());
        Ok(())
    }
}
