//! Run command: one controller cycle per invocation.
//!
//! Meant to be called by cron or a systemd timer right before each capture.
//! With `--json` all logging is silenced and only the capture parameters are
//! printed, for the capture script to read:
//!
//! ```json
//! {"shutter_speed":204414,"gain":1.0}
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::sync::Arc;

use super::CommandContext;
use crate::args::GlobalArgs;
use crate::core::{log_cycle_report, run_cycle};
use crate::logger::Log;
use crate::time_source::{self, FixedTimeSource, RealTimeSource};

/// Handle the run command.
///
/// # Arguments
/// * `dry_run` - compute and report without saving state
/// * `json` - print capture parameters as JSON instead of logging
/// * `at` - use this wall-clock time instead of the system clock
pub fn handle_run_command(
    global: &GlobalArgs,
    dry_run: bool,
    json: bool,
    at: Option<NaiveDateTime>,
) -> Result<()> {
    if json {
        Log::set_enabled(false);
    }

    match at {
        Some(instant) => time_source::init_time_source(Arc::new(FixedTimeSource::new(instant))),
        None => time_source::init_time_source(Arc::new(RealTimeSource)),
    }

    let ctx = CommandContext::prepare(global)?;

    log_version!();
    if ctx.debug_enabled {
        ctx.config.log_config();
    }

    let settings = ctx.settings();
    let sun = ctx.sun_table();
    let store = ctx.state_store();
    let now = time_source::now();

    let report = run_cycle(now, &store, &sun, &settings, !dry_run)?;

    if json {
        let output = serde_json::to_string(&report.decision.capture)
            .context("Failed to serialize capture parameters")?;
        println!("{output}");
        return Ok(());
    }

    log_cycle_report(&report, ctx.debug_enabled);
    log_end!();
    Ok(())
}

/// Display help for the run command
pub fn display_help() {
    log_version!();
    log_block_start!("run - Compute exposure for the next capture");
    log_block_start!("Usage: duskcam [run] [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("--dry-run, --test       Report values without saving state");
    log_indented!("--json                  Print {{\"shutter_speed\", \"gain\"}} as JSON only");
    log_indented!("--at <datetime>         Use \"YYYY-MM-DD HH:MM[:SS]\" instead of now");
    log_block_start!("Examples:");
    log_indented!("# From a capture script");
    log_indented!("duskcam run --json");
    log_pipe!();
    log_indented!("# What would happen just after tonight's sunset?");
    log_indented!("duskcam run --dry-run --at \"2024-06-21 21:50\"");
    log_end!();
}
