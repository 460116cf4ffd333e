//! Main application entry point.
//!
//! Parses the command line and hands off to the matching command in
//! `duskcam::commands`. Any error that reaches this level is logged and the
//! process exits with a failure status, so cron and systemd can notice.

use duskcam::args::{self, CliAction, ParsedArgs};
use duskcam::commands;
use duskcam::common::constants::EXIT_FAILURE;
use duskcam::logger::Log;
use duskcam::{log_end, log_error_exit};

fn dispatch(action: CliAction) -> anyhow::Result<()> {
    match action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Help { command } => commands::help::run_help_command(command.as_deref()),
        CliAction::Run {
            global,
            dry_run,
            json,
            at,
        } => commands::run::handle_run_command(&global, dry_run, json, at),
        CliAction::Status { global } => commands::status::handle_status_command(&global),
        CliAction::Reset { global } => commands::reset::handle_reset_command(&global),
        CliAction::Simulate {
            global,
            start_time,
            end_time,
            interval,
        } => commands::simulate::handle_simulate_command(&global, start_time, end_time, interval),
        CliAction::SunTable {
            global,
            latitude,
            longitude,
            year,
            timezone,
            output,
            save_location,
        } => commands::suntable::handle_suntable_command(
            &global,
            commands::suntable::SunTableArgs {
                latitude,
                longitude,
                year,
                timezone,
                output,
                save_location,
            },
        ),
    }
}

fn main() {
    let parsed_args = ParsedArgs::from_env();

    if let Err(e) = dispatch(parsed_args.action) {
        if Log::is_enabled() {
            log_error_exit!("{:#}", e);
            log_end!();
        } else {
            eprintln!("duskcam: {e:#}");
        }
        std::process::exit(EXIT_FAILURE);
    }
}
