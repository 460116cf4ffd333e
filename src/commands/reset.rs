//! Reset command: start the next capture from daytime values.

use anyhow::Result;

use super::CommandContext;
use crate::args::GlobalArgs;
use crate::common::utils::{format_shutter, private_path};
use crate::state::{ExposureState, StateStore};

pub fn handle_reset_command(global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::prepare(global)?;
    log_version!();

    let defaults = ExposureState::daytime(&ctx.settings());
    let store = ctx.state_store();
    store.save(&defaults)?;

    log_block_start!("Reset saved state at {}", private_path(store.path()));
    log_indented!(
        "Shutter: {} ({} µs)",
        format_shutter(defaults.shutter_speed),
        defaults.shutter_speed
    );
    log_indented!("Gain: {:.2}", defaults.gain);
    log_end!();
    Ok(())
}

/// Display help for the reset command
pub fn display_help() {
    log_version!();
    log_block_start!("reset - Reset saved state to daytime values");
    log_block_start!("Usage: duskcam reset");
    log_block_start!("Overwrites the state file with the daytime shutter speed and gain,");
    log_indented!("zero photo counter and zero gain carry. Use after changing cameras");
    log_indented!("or when a ramp was interrupted for a long time.");
    log_end!();
}
