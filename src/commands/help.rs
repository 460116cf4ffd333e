//! Help command implementation for duskcam.
//!
//! This module provides a dispatcher for the help command that shows
//! command-specific help or general help based on the arguments provided.

use anyhow::Result;

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("help") => display_help_help(),
        Some("run") => super::run::display_help(),
        Some("status") | Some("s") => super::status::display_help(),
        Some("reset") => super::reset::display_help(),
        Some("simulate") | Some("sim") => super::simulate::display_help(),
        Some("suntable") | Some("table") => super::suntable::display_help(),
        Some(unknown) => {
            log_warning_standalone!("Unknown command: {}", unknown);
            display_general_help();
        }
    }
    Ok(())
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("run                     Compute exposure for this capture (default)");
    log_indented!("status, s               Show configuration, sun times and saved state");
    log_indented!("reset                   Reset saved state to daytime values");
    log_indented!("simulate, sim           Replay the controller over a time range");
    log_indented!("suntable, table         Generate a sun times table for a location");
    log_indented!("help [COMMAND]          Show detailed help for a command");
    log_pipe!();
    log_info!("Use 'duskcam help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'duskcam --help' to see all options and general usage.");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: duskcam help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_block_start!("Examples:");
    log_indented!("duskcam help");
    log_indented!("duskcam help simulate");
    log_end!();
}
