//! Configuration file building and default config creation.
//!
//! Handles writing the commented default `duskcam.toml` and updating the
//! location fields of an existing file in place without disturbing the
//! user's comments.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;
use crate::common::utils::private_path;

/// Create a default config file at `path`, including its directory.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(path, default_config_content()).context("Failed to write default config file")?;
    Ok(())
}

/// The default configuration, with every value annotated with its range.
pub(crate) fn default_config_content() -> String {
    let mut content = ConfigBuilder::new()
        .add_section("Exposure")
        .add_setting(
            "daytime_shutter",
            &DEFAULT_DAYTIME_SHUTTER.to_string(),
            &format!(
                "Daytime shutter speed in microseconds ({MINIMUM_SHUTTER}-{MAXIMUM_SHUTTER})"
            ),
        )
        .add_setting(
            "max_shutter",
            &DEFAULT_MAX_SHUTTER.to_string(),
            &format!(
                "Full-night shutter speed in microseconds ({MINIMUM_SHUTTER}-{MAXIMUM_SHUTTER})"
            ),
        )
        .add_setting(
            "daytime_gain",
            &format!("{DEFAULT_DAYTIME_GAIN:.1}"),
            &format!("Daytime analog gain, never below {GAIN_FLOOR} in practice (0-{MAXIMUM_GAIN})"),
        )
        .add_setting(
            "max_gain",
            &format!("{DEFAULT_MAX_GAIN:.1}"),
            &format!("Full-night analog gain ({GAIN_FLOOR}-{MAXIMUM_GAIN})"),
        )
        .add_section("Transitions")
        .add_setting(
            "ramp_steps",
            &DEFAULT_RAMP_STEPS.to_string(),
            &format!(
                "Captures from daytime to full-night values ({MINIMUM_RAMP_STEPS}-{MAXIMUM_RAMP_STEPS})"
            ),
        )
        .add_setting(
            "sunrise_offset_minutes",
            &DEFAULT_SUNRISE_OFFSET_MINUTES.to_string(),
            &format!(
                "Sunrise ramp start relative to sunrise ({MINIMUM_SUNRISE_OFFSET} to {MAXIMUM_SUNRISE_OFFSET})"
            ),
        )
        .add_setting(
            "sunset_window_minutes",
            &DEFAULT_SUNSET_WINDOW_MINUTES.to_string(),
            &format!(
                "Sunset ramp length after sunset ({MINIMUM_SUNSET_WINDOW}-{MAXIMUM_SUNSET_WINDOW})"
            ),
        )
        .add_setting(
            "capture_interval",
            &DEFAULT_CAPTURE_INTERVAL.to_string(),
            &format!(
                "Seconds between captures ({MINIMUM_CAPTURE_INTERVAL}-{MAXIMUM_CAPTURE_INTERVAL})"
            ),
        )
        .add_section("Files")
        .add_setting(
            "sun_table",
            &format!("\"{DEFAULT_SUN_TABLE}\""),
            "Sun times table, relative to this directory ('duskcam suntable' writes one)",
        )
        .build();

    content.push_str(
        "\n# state_file = \"~/.local/state/duskcam/camera_state.json\"\
         \n# log_file = \"~/.local/state/duskcam/duskcam.log\"\n\
         \n#[Location]\
         \n# latitude = 48.8566\
         \n# longitude = 2.3522\
         \n# timezone = \"Europe/Paris\"\n",
    );
    content
}

/// Write latitude, longitude and optionally timezone into an existing config.
///
/// Existing lines keep their comment column; missing keys are appended.
pub fn update_location(
    config_path: &Path,
    latitude: f64,
    longitude: f64,
    timezone: Option<&str>,
) -> Result<()> {
    if !config_path.exists() {
        anyhow::bail!(
            "No existing config file found at {}",
            private_path(config_path)
        );
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config from {}", private_path(config_path)))?;

    let mut updates = vec![
        ("latitude", format!("{latitude:.6}")),
        ("longitude", format!("{longitude:.6}")),
    ];
    if let Some(tz) = timezone {
        updates.push(("timezone", format!("\"{tz}\"")));
    }

    let mut updated_content = content.clone();
    let mut missing = Vec::new();

    for (key, value) in &updates {
        match find_config_line(&content, key) {
            Some(line) => {
                let new_line = preserve_comment_formatting(&line, key, value);
                updated_content = updated_content.replace(&line, &new_line);
            }
            None => missing.push(format!("{key} = {value}")),
        }
    }

    if !missing.is_empty() {
        if !updated_content.ends_with('\n') {
            updated_content.push('\n');
        }
        for line in missing {
            updated_content.push_str(&line);
            updated_content.push('\n');
        }
    }

    fs::write(config_path, updated_content).with_context(|| {
        format!(
            "Failed to write updated config to {}",
            private_path(config_path)
        )
    })?;

    log_block_start!("Updated config file: {}", private_path(config_path));
    log_indented!("Latitude: {latitude:.6}");
    log_indented!("Longitude: {longitude:.6}");
    if let Some(tz) = timezone {
        log_indented!("Timezone: {tz}");
    }

    Ok(())
}

/// Builder for creating dynamically-aligned configuration files.
///
/// This builder maintains proper comment alignment by calculating the maximum
/// width of all setting lines and applying consistent padding, so the file
/// stays tidy when defaults in constants.rs change.
struct ConfigBuilder {
    entries: Vec<EntryType>,
}

enum EntryType {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(EntryType::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(EntryType::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        // Widest setting line plus one space before the comment
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                EntryType::Setting { line, .. } => Some(line.len()),
                EntryType::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                EntryType::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                EntryType::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        let mut output = result.join("\n");
        output.push('\n');
        output
    }
}

/// Find an active (uncommented) config line for `key`.
pub(crate) fn find_config_line(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .find(|line| {
            let trimmed = line.trim_start();
            !trimmed.starts_with('#')
                && trimmed
                    .split_once('=')
                    .is_some_and(|(name, _)| name.trim() == key)
        })
        .map(str::to_string)
}

/// Replace the value of a config line, keeping the spacing before its comment.
pub(crate) fn preserve_comment_formatting(
    original_line: &str,
    key: &str,
    new_value: &str,
) -> String {
    let key_value_part = format!("{key} = {new_value}");

    let Some(comment_pos) = original_line.find('#') else {
        return key_value_part;
    };
    let comment_part = &original_line[comment_pos..];

    // Keep the comment in the same column when the new value fits
    let padding = comment_pos.saturating_sub(key_value_part.len()).max(1);
    format!("{key_value_part}{}{comment_part}", " ".repeat(padding))
}
