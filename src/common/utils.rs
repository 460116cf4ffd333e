//! Small helpers shared by commands and loaders.

use std::path::Path;

/// Render a path for log output with the home directory replaced by `~`.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}

/// Format a shutter speed in microseconds the way photographers read it.
pub fn format_shutter(micros: u64) -> String {
    if micros >= 1_000_000 {
        format!("{:.1}s", micros as f64 / 1_000_000.0)
    } else if micros >= 1000 {
        format!("1/{}s", (1_000_000.0 / micros as f64).round() as u64)
    } else {
        format!("{micros}µs")
    }
}
