//! Simulate command: replay the controller over a time range.
//!
//! A [`SimulatedTimeSource`] stands in for the system clock and is advanced
//! by the capture interval after every cycle, so a whole night runs in a
//! moment. State lives in memory, starting cold, and the saved state file
//! is never touched. Every log line carries the simulated time.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use std::sync::Arc;

use super::CommandContext;
use crate::args::GlobalArgs;
use crate::core::{CaptureParams, CycleReport, ExposureSettings, run_cycle};
use crate::state::{ExposureState, MemoryStateStore, StateStore};
use crate::sun::SunTimesProvider;
use crate::time_source::{self, SimulatedTimeSource, TimeSource};

/// Totals for a finished simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub captures: u64,
    pub phase_changes: usize,
    /// Longest exposure used
    pub peak: CaptureParams,
    pub final_state: ExposureState,
}

/// Drive the controller from the source's current time to its end time.
///
/// `on_step` sees every cycle and whether its phase differs from the
/// previous one. The end time itself is always simulated.
pub fn run_simulation(
    source: &SimulatedTimeSource,
    interval: Duration,
    sun: &impl SunTimesProvider,
    settings: &ExposureSettings,
    store: &impl StateStore,
    mut on_step: impl FnMut(&CycleReport, bool),
) -> Result<SimulationSummary> {
    if interval <= Duration::zero() {
        anyhow::bail!("Simulation interval must be positive");
    }

    let mut previous_phase = None;
    let mut captures = 0;
    let mut phase_changes = 0;
    let mut peak: Option<CaptureParams> = None;

    let final_state = loop {
        let report = run_cycle(source.now(), store, sun, settings, true)?;
        let decision = &report.decision;

        let changed = previous_phase != Some(decision.phase);
        if changed && previous_phase.is_some() {
            phase_changes += 1;
        }
        previous_phase = Some(decision.phase);

        captures += 1;
        if peak.is_none_or(|p| decision.capture.shutter_speed > p.shutter_speed) {
            peak = Some(decision.capture);
        }

        on_step(&report, changed);

        if source.is_ended() {
            break report.decision.next_state;
        }
        source.advance(interval);
    };

    Ok(SimulationSummary {
        captures,
        phase_changes,
        peak: peak.unwrap_or(CaptureParams {
            shutter_speed: final_state.shutter_speed,
            gain: final_state.gain,
        }),
        final_state,
    })
}

pub fn handle_simulate_command(
    global: &GlobalArgs,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    interval: Option<u64>,
) -> Result<()> {
    let source = Arc::new(SimulatedTimeSource::new(start_time, end_time));
    time_source::init_time_source(source.clone());

    let ctx = CommandContext::prepare(global)?;
    let settings = ctx.settings();
    let interval_secs = interval.unwrap_or_else(|| ctx.config.capture_interval());

    let interval = i64::try_from(interval_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .with_context(|| format!("Capture interval of {interval_secs} seconds is too long"))?;

    log_version!();
    log_block_start!("Simulation Mode");
    log_indented!(
        "From {} to {}",
        start_time.format("%Y-%m-%d %H:%M:%S"),
        end_time.format("%Y-%m-%d %H:%M:%S")
    );
    log_indented!("One capture every {} seconds", interval_secs);
    log_indented!("Starting from daytime values, saved state is not modified");
    if ctx.debug_enabled {
        ctx.config.log_config();
    }

    let sun = ctx.sun_table();
    let store = MemoryStateStore::new(ExposureState::daytime(&settings));
    let debug_enabled = ctx.debug_enabled;

    let summary = run_simulation(
        &source,
        interval,
        &sun,
        &settings,
        &store,
        |report, phase_changed| {
            let decision = &report.decision;
            if phase_changed {
                log_block_start!(
                    "{}{}",
                    decision.phase.symbol(),
                    decision.phase.display_name()
                );
            }
            if phase_changed || decision.phase.is_ramping() || debug_enabled {
                log_indented!("{}", decision.capture);
            }
            if debug_enabled {
                log_debug!(
                    "Gain carry {:.4}, photo {}",
                    decision.next_state.gain_increment_counter,
                    decision.next_state.photo_counter
                );
            }
        },
    )?;

    log_block_start!("Simulation complete");
    log_indented!("Captures: {}", summary.captures);
    log_indented!("Phase changes: {}", summary.phase_changes);
    log_indented!("Longest exposure: {}", summary.peak);
    log_indented!(
        "Final state: {}",
        CaptureParams {
            shutter_speed: summary.final_state.shutter_speed,
            gain: summary.final_state.gain,
        }
    );
    log_end!();
    Ok(())
}

/// Display help for the simulate command
pub fn display_help() {
    log_version!();
    log_block_start!("simulate - Replay the controller over a time range");
    log_block_start!("Usage: duskcam simulate --from <datetime> --to <datetime> [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("--from <datetime>       Start, \"YYYY-MM-DD HH:MM[:SS]\"");
    log_indented!("--to <datetime>         End, \"YYYY-MM-DD HH:MM[:SS]\"");
    log_indented!("--interval <seconds>    Time between captures (default: capture_interval)");
    log_block_start!("Notes:");
    log_indented!("Ramp steps are logged individually, steady phases only when they begin.");
    log_indented!("Use --debug to log every capture.");
    log_block_start!("Examples:");
    log_indented!("duskcam simulate --from \"2024-06-21 20:00\" --to \"2024-06-22 06:00\"");
    log_end!();
}
