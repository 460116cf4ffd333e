//! Status command: what the controller sees right now.
//!
//! Shows the resolved configuration, today's sun times, the phase at the
//! current time, the saved state and the values the next `run` would use.
//! Nothing is written.

use anyhow::Result;
use chrono::Duration;
use std::sync::Arc;

use super::CommandContext;
use crate::args::GlobalArgs;
use crate::common::utils::{format_shutter, private_path};
use crate::core::compute_next_exposure;
use crate::state::{DefaultReason, StateStore};
use crate::sun::{SunTimesProvider, date_key};
use crate::time_source::{self, RealTimeSource};

pub fn handle_status_command(global: &GlobalArgs) -> Result<()> {
    time_source::init_time_source(Arc::new(RealTimeSource));
    let ctx = CommandContext::prepare(global)?;

    log_version!();
    ctx.config.log_config();

    let settings = ctx.settings();
    let sun = ctx.sun_table();
    let now = time_source::now();
    let today = now.date();

    log_block_start!("Sun times for {} ({})", today, date_key(today));
    match sun.sun_times(today) {
        Some(times) => {
            log_indented!("Sunrise: {}", times.sunrise);
            log_indented!("Sunset: {}", times.sunset);
            if let Some((sunrise, sunset)) = times.clock_times() {
                let ramp_start = sunrise + Duration::minutes(settings.sunrise_offset_minutes);
                let ramp_end =
                    sunset + Duration::minutes(settings.sunset_window_minutes as i64);
                log_indented!(
                    "Sunrise ramp: {} → {}",
                    ramp_start.format("%H:%M"),
                    sunrise.format("%H:%M")
                );
                log_indented!(
                    "Sunset ramp: {} → {}",
                    sunset.format("%H:%M"),
                    ramp_end.format("%H:%M")
                );
            }
        }
        None => log_indented!("No entry for today, daytime values apply"),
    }
    if ctx.debug_enabled && !sun.is_empty() {
        log_debug!(
            "{} table entries, {} polar days",
            sun.len(),
            sun.polar_days()
        );
    }

    let store = ctx.state_store();
    let outcome = store.load();
    log_block_start!("Saved state: {}", private_path(store.path()));
    match outcome.default_reason() {
        None => {}
        Some(DefaultReason::Missing) => log_indented!("No saved state yet"),
        Some(reason) => log_warning!("{reason}"),
    }
    let state = outcome.state();
    log_indented!(
        "Shutter: {} ({} µs)",
        format_shutter(state.shutter_speed),
        state.shutter_speed
    );
    log_indented!("Gain: {:.2}", state.gain);
    log_indented!("Photo counter: {}", state.photo_counter);
    log_indented!("Gain carry: {:.4}", state.gain_increment_counter);

    let decision = compute_next_exposure(now, state, &sun, &settings);
    log_block_start!(
        "{}{} at {}",
        decision.phase.symbol(),
        decision.phase.display_name(),
        now.format("%H:%M:%S")
    );
    log_indented!("Next capture: {}", decision.capture);
    log_end!();

    Ok(())
}

/// Display help for the status command
pub fn display_help() {
    log_version!();
    log_block_start!("status - Show configuration, sun times and saved state");
    log_block_start!("Usage: duskcam status");
    log_block_start!("Shows:");
    log_indented!("The loaded configuration and file locations");
    log_indented!("Today's sunrise, sunset and ramp windows");
    log_indented!("The saved exposure state");
    log_indented!("The current phase and the values the next capture would use");
    log_end!();
}
