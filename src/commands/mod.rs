//! Command-line command handlers for duskcam.
//!
//! Each command is implemented in its own submodule. They share the setup in
//! [`CommandContext`]: select the config directory, load and validate the
//! configuration, and start file logging when one is configured.

pub mod help;
pub mod reset;
pub mod run;
pub mod simulate;
pub mod status;
pub mod suntable;

use anyhow::{Context, Result};
use std::path::Path;

use crate::args::GlobalArgs;
use crate::common::utils::private_path;
use crate::config::{self, Config};
use crate::core::ExposureSettings;
use crate::logger::{Log, LoggerGuard};
use crate::state::{ExposureState, JsonStateStore};
use crate::sun::SunTable;

/// Configuration and logging shared by every command invocation.
pub struct CommandContext {
    pub config: Config,
    pub debug_enabled: bool,
    // Flushes the log file on drop
    _log_guard: Option<LoggerGuard>,
}

impl CommandContext {
    /// Load configuration for this process and start file logging if asked.
    ///
    /// `--log` on the command line wins over `log_file` in the config.
    pub fn prepare(global: &GlobalArgs) -> Result<Self> {
        config::set_config_dir(global.config_dir.clone())?;

        let mut log_guard = match &global.log_file {
            Some(path) => start_log_file(Path::new(path))?,
            None => None,
        };

        let config = Config::load()?;

        if log_guard.is_none()
            && global.log_file.is_none()
            && let Some(path) = config.log_file_path()
        {
            log_guard = start_log_file(&path)?;
        }

        Ok(Self {
            config,
            debug_enabled: global.debug_enabled,
            _log_guard: log_guard,
        })
    }

    pub fn settings(&self) -> ExposureSettings {
        self.config.exposure_settings()
    }

    /// File-backed state store with daytime defaults for these settings.
    pub fn state_store(&self) -> JsonStateStore {
        JsonStateStore::new(
            self.config.state_file_path(),
            ExposureState::daytime(&self.settings()),
        )
    }

    /// Load the configured sun table.
    ///
    /// A table that cannot be loaded is reported and replaced by an empty
    /// one, so every date falls back to daytime values and captures go on.
    pub fn sun_table(&self) -> SunTable {
        let path = self.config.sun_table_path();
        match SunTable::load(&path) {
            Ok(table) => {
                if self.debug_enabled {
                    log_debug!(
                        "Loaded {} sun table entries from {}",
                        table.len(),
                        private_path(&path)
                    );
                }
                table
            }
            Err(e) => {
                log_pipe!();
                log_warning!("{:#}", e);
                log_indented!("Using daytime values until a sun table is available");
                log_indented!("Run 'duskcam suntable --lat <deg> --lon <deg>' to create one");
                SunTable::new()
            }
        }
    }
}

/// Route output to `path`; nothing to route while output is disabled.
fn start_log_file(path: &Path) -> Result<Option<LoggerGuard>> {
    if !Log::is_enabled() {
        return Ok(None);
    }
    Log::start_file_logging(path.to_string_lossy().into_owned())
        .map(Some)
        .with_context(|| format!("Failed to open log file {}", private_path(path)))
}
