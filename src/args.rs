//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a clean
//! interface for the main application logic. Global flags (`--debug`,
//! `--config`, `--log`, `--help`, `--version`) are accepted anywhere; the
//! first non-flag argument selects the command, and `run` is assumed when
//! there is none so cron lines stay short.

use chrono::NaiveDateTime;

use crate::common::constants::{MAXIMUM_CAPTURE_INTERVAL, MINIMUM_CAPTURE_INTERVAL};
use crate::time_source::parse_datetime;

/// Flags shared by every command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalArgs {
    pub debug_enabled: bool,
    pub config_dir: Option<String>,
    pub log_file: Option<String>,
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// One controller cycle
    Run {
        global: GlobalArgs,
        /// Compute and report without saving state
        dry_run: bool,
        /// Print capture parameters as JSON instead of logging
        json: bool,
        /// Pin the clock instead of reading it
        at: Option<NaiveDateTime>,
    },
    /// Show configuration, sun times, phase and saved state
    Status { global: GlobalArgs },
    /// Overwrite the saved state with daytime defaults
    Reset { global: GlobalArgs },
    /// Run the controller over a time range with a simulated clock
    Simulate {
        global: GlobalArgs,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        /// Seconds between simulated captures, defaults to `capture_interval`
        interval: Option<u64>,
    },
    /// Generate a sun times table for a location
    SunTable {
        global: GlobalArgs,
        latitude: Option<f64>,
        longitude: Option<f64>,
        year: Option<i32>,
        timezone: Option<String>,
        output: Option<String>,
        save_location: bool,
    },
    /// Help for one command, or the command overview
    Help { command: Option<String> },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

/// Take the value following a flag, logging when it is missing.
fn take_value(args: &[String], idx: &mut usize, flag: &str) -> Option<String> {
    match args.get(*idx + 1) {
        Some(value) if !value.starts_with("--") => {
            *idx += 1;
            Some(value.clone())
        }
        _ => {
            log_error!("Missing value for {flag}");
            None
        }
    }
}

/// Parse a flag value, logging what was expected on failure.
fn parse_value<T: std::str::FromStr>(value: Option<String>, flag: &str, expected: &str) -> Option<T> {
    let value = value?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log_error!("Invalid value for {flag}: '{value}'. Expected {expected}");
            None
        }
    }
}

fn parse_time_value(value: Option<String>, flag: &str) -> Option<NaiveDateTime> {
    match parse_datetime(&value?) {
        Ok(time) => Some(time),
        Err(e) => {
            log_error!("Invalid value for {flag}: {e}");
            None
        }
    }
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut global = GlobalArgs::default();
        let mut display_help = false;
        let mut display_version = false;
        let mut error_found = false;
        let mut rest: Vec<String> = Vec::new();

        // First pass: global flags, wherever they appear
        let mut i = 0;
        while i < args_vec.len() {
            match args_vec[i].as_str() {
                "--debug" | "-d" => global.debug_enabled = true,
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--config" | "-c" => match take_value(&args_vec, &mut i, "--config") {
                    Some(dir) => global.config_dir = Some(dir),
                    None => error_found = true,
                },
                "--log" | "-l" => match take_value(&args_vec, &mut i, "--log") {
                    Some(path) => global.log_file = Some(path),
                    None => error_found = true,
                },
                other => rest.push(other.to_string()),
            }
            i += 1;
        }

        // Version takes precedence over help, help over everything else
        if display_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if display_help {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }
        if error_found {
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }

        let (command, options) = match rest.first() {
            Some(first) if !first.starts_with('-') => (first.clone(), rest[1..].to_vec()),
            _ => ("run".to_string(), rest),
        };

        let action = match command.as_str() {
            "run" => parse_run(global, &options),
            "status" | "s" => no_options("status", &options, CliAction::Status { global }),
            "reset" => no_options("reset", &options, CliAction::Reset { global }),
            "simulate" | "sim" => parse_simulate(global, &options),
            "suntable" | "table" => parse_suntable(global, &options),
            "help" => parse_help(&options),
            unknown => {
                log_warning!("Unknown command: {unknown}");
                CliAction::ShowHelpDueToError
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

fn unknown_option(command: &str, arg: &str) -> CliAction {
    if arg.starts_with('-') {
        log_warning!("Unknown option for {command}: {arg}");
    } else {
        log_warning!("Unexpected argument for {command}: {arg}");
    }
    CliAction::ShowHelpDueToError
}

fn no_options(command: &str, options: &[String], action: CliAction) -> CliAction {
    match options.first() {
        Some(arg) => unknown_option(command, arg),
        None => action,
    }
}

fn parse_run(global: GlobalArgs, options: &[String]) -> CliAction {
    let mut dry_run = false;
    let mut json = false;
    let mut at = None;

    let mut i = 0;
    while i < options.len() {
        match options[i].as_str() {
            "--dry-run" | "--test" | "-t" => dry_run = true,
            "--json" => json = true,
            "--at" => match parse_time_value(take_value(options, &mut i, "--at"), "--at") {
                Some(time) => at = Some(time),
                None => return CliAction::ShowHelpDueToError,
            },
            other => return unknown_option("run", other),
        }
        i += 1;
    }

    CliAction::Run {
        global,
        dry_run,
        json,
        at,
    }
}

fn parse_simulate(global: GlobalArgs, options: &[String]) -> CliAction {
    let mut start_time = None;
    let mut end_time = None;
    let mut interval = None;

    let mut i = 0;
    while i < options.len() {
        let flag = options[i].clone();
        let parsed = match flag.as_str() {
            "--from" => {
                start_time = parse_time_value(take_value(options, &mut i, &flag), &flag);
                start_time.is_some()
            }
            "--to" => {
                end_time = parse_time_value(take_value(options, &mut i, &flag), &flag);
                end_time.is_some()
            }
            "--interval" => {
                interval = parse_value::<u64>(
                    take_value(options, &mut i, &flag),
                    &flag,
                    "a number of seconds",
                )
                .filter(|secs| {
                    let in_range =
                        (MINIMUM_CAPTURE_INTERVAL..=MAXIMUM_CAPTURE_INTERVAL).contains(secs);
                    if !in_range {
                        log_error!(
                            "--interval must be between {} and {} seconds (got {})",
                            MINIMUM_CAPTURE_INTERVAL,
                            MAXIMUM_CAPTURE_INTERVAL,
                            secs
                        );
                    }
                    in_range
                });
                interval.is_some()
            }
            other => return unknown_option("simulate", other),
        };
        if !parsed {
            return CliAction::ShowHelpDueToError;
        }
        i += 1;
    }

    match (start_time, end_time) {
        (Some(start_time), Some(end_time)) if start_time < end_time => CliAction::Simulate {
            global,
            start_time,
            end_time,
            interval,
        },
        (Some(_), Some(_)) => {
            log_error!("--to must be later than --from");
            CliAction::ShowHelpDueToError
        }
        _ => {
            log_warning!(
                "Missing start or end time. Usage: duskcam simulate --from \"YYYY-MM-DD HH:MM\" --to \"YYYY-MM-DD HH:MM\""
            );
            CliAction::ShowHelpDueToError
        }
    }
}

fn parse_suntable(global: GlobalArgs, options: &[String]) -> CliAction {
    let mut latitude = None;
    let mut longitude = None;
    let mut year = None;
    let mut timezone = None;
    let mut output = None;
    let mut save_location = false;

    let mut i = 0;
    while i < options.len() {
        let flag = options[i].clone();
        let parsed = match flag.as_str() {
            "--lat" | "--latitude" => {
                latitude = parse_value::<f64>(take_value(options, &mut i, &flag), &flag, "degrees");
                latitude.is_some()
            }
            "--lon" | "--longitude" => {
                longitude =
                    parse_value::<f64>(take_value(options, &mut i, &flag), &flag, "degrees");
                longitude.is_some()
            }
            "--year" => {
                year = parse_value::<i32>(take_value(options, &mut i, &flag), &flag, "a year");
                year.is_some()
            }
            "--timezone" | "--tz" => {
                timezone = take_value(options, &mut i, &flag);
                timezone.is_some()
            }
            "--output" | "-o" => {
                output = take_value(options, &mut i, &flag);
                output.is_some()
            }
            "--save-location" => {
                save_location = true;
                true
            }
            other => return unknown_option("suntable", other),
        };
        if !parsed {
            return CliAction::ShowHelpDueToError;
        }
        i += 1;
    }

    if latitude.is_some() != longitude.is_some() {
        log_error!("--lat and --lon must be given together");
        return CliAction::ShowHelpDueToError;
    }

    CliAction::SunTable {
        global,
        latitude,
        longitude,
        year,
        timezone,
        output,
        save_location,
    }
}

fn parse_help(options: &[String]) -> CliAction {
    match options {
        [] => CliAction::Help { command: None },
        [command] => CliAction::Help {
            command: Some(command.clone()),
        },
        [_, extra, ..] => unknown_option("help", extra),
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("duskcam [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-l, --log <path>       Append all output to a log file");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("run                    Compute exposure for this capture (default)");
    log_indented!("status, s              Show configuration, sun times and saved state");
    log_indented!("reset                  Reset saved state to daytime values");
    log_indented!("simulate, sim          Replay the controller over a time range");
    log_indented!("suntable, table        Generate a sun times table for a location");
    log_indented!("help [COMMAND]         Show detailed help for a command");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 21)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn run(global: GlobalArgs) -> CliAction {
        CliAction::Run {
            global,
            dry_run: false,
            json: false,
            at: None,
        }
    }

    #[test]
    fn test_parse_no_args() {
        let parsed = ParsedArgs::parse(vec!["duskcam"]);
        assert_eq!(parsed.action, run(GlobalArgs::default()));
    }

    #[test]
    fn test_parse_debug_flag() {
        for flag in ["--debug", "-d"] {
            let parsed = ParsedArgs::parse(vec!["duskcam", flag]);
            assert_eq!(
                parsed.action,
                run(GlobalArgs {
                    debug_enabled: true,
                    ..Default::default()
                })
            );
        }
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(ParsedArgs::parse(vec!["duskcam", "--help"]).action, CliAction::ShowHelp);
        assert_eq!(ParsedArgs::parse(vec!["duskcam", "-h"]).action, CliAction::ShowHelp);
        assert_eq!(
            ParsedArgs::parse(vec!["duskcam", "--version"]).action,
            CliAction::ShowVersion
        );
        assert_eq!(ParsedArgs::parse(vec!["duskcam", "-V"]).action, CliAction::ShowVersion);
    }

    #[test]
    fn test_version_takes_precedence() {
        let parsed = ParsedArgs::parse(vec!["duskcam", "--version", "--help", "--debug"]);
        assert_eq!(parsed.action, CliAction::ShowVersion);
    }

    #[test]
    fn test_help_flag_beats_command() {
        let parsed = ParsedArgs::parse(vec!["duskcam", "status", "--help"]);
        assert_eq!(parsed.action, CliAction::ShowHelp);
    }

    #[test]
    fn test_parse_unknown_flag() {
        let parsed = ParsedArgs::parse(vec!["duskcam", "--unknown"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_unknown_command() {
        let parsed = ParsedArgs::parse(vec!["duskcam", "capture"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_run_flags_without_command() {
        let parsed = ParsedArgs::parse(vec!["duskcam", "--test", "--json"]);
        assert_eq!(
            parsed.action,
            CliAction::Run {
                global: GlobalArgs::default(),
                dry_run: true,
                json: true,
                at: None,
            }
        );
    }

    #[test]
    fn test_run_with_pinned_time_and_globals() {
        let parsed = ParsedArgs::parse(vec![
            "duskcam",
            "-c",
            "/etc/duskcam",
            "run",
            "--at",
            "2024-06-21 21:15",
            "--dry-run",
            "--log",
            "/var/log/duskcam.log",
        ]);
        assert_eq!(
            parsed.action,
            CliAction::Run {
                global: GlobalArgs {
                    debug_enabled: false,
                    config_dir: Some("/etc/duskcam".into()),
                    log_file: Some("/var/log/duskcam.log".into()),
                },
                dry_run: true,
                json: false,
                at: Some(at(21, 15)),
            }
        );
    }

    #[test]
    fn test_run_rejects_bad_time() {
        let parsed = ParsedArgs::parse(vec!["duskcam", "run", "--at", "21:15"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);

        let parsed = ParsedArgs::parse(vec!["duskcam", "run", "--at"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_config_without_value() {
        let parsed = ParsedArgs::parse(vec!["duskcam", "--config"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_status_and_reset() {
        assert_eq!(
            ParsedArgs::parse(vec!["duskcam", "status"]).action,
            CliAction::Status {
                global: GlobalArgs::default()
            }
        );
        assert_eq!(
            ParsedArgs::parse(vec!["duskcam", "-d", "reset"]).action,
            CliAction::Reset {
                global: GlobalArgs {
                    debug_enabled: true,
                    ..Default::default()
                }
            }
        );
        assert_eq!(
            ParsedArgs::parse(vec!["duskcam", "reset", "now"]).action,
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_simulate() {
        let parsed = ParsedArgs::parse(vec![
            "duskcam",
            "simulate",
            "--from",
            "2024-06-21 20:00",
            "--to",
            "2024-06-21 23:30:00",
            "--interval",
            "300",
        ]);
        assert_eq!(
            parsed.action,
            CliAction::Simulate {
                global: GlobalArgs::default(),
                start_time: at(20, 0),
                end_time: at(23, 30),
                interval: Some(300),
            }
        );
    }

    #[test]
    fn test_simulate_requires_ordered_range() {
        let parsed = ParsedArgs::parse(vec![
            "duskcam",
            "simulate",
            "--from",
            "2024-06-21 23:00",
            "--to",
            "2024-06-21 20:00",
        ]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);

        let parsed = ParsedArgs::parse(vec!["duskcam", "sim", "--from", "2024-06-21 23:00"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);

        let parsed = ParsedArgs::parse(vec![
            "duskcam",
            "sim",
            "--from",
            "2024-06-21 20:00",
            "--to",
            "2024-06-21 23:00",
            "--interval",
            "0",
        ]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_simulate_interval_is_bounded() {
        let with_interval = |secs: &str| {
            ParsedArgs::parse(vec![
                "duskcam",
                "simulate",
                "--from",
                "2024-06-21 20:00",
                "--to",
                "2024-06-21 23:00",
                "--interval",
                secs,
            ])
            .action
        };

        assert!(matches!(
            with_interval("86400"),
            CliAction::Simulate {
                interval: Some(86_400),
                ..
            }
        ));
        assert_eq!(with_interval("86401"), CliAction::ShowHelpDueToError);
        assert_eq!(
            with_interval("9223372036854775807"),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_suntable() {
        let parsed = ParsedArgs::parse(vec![
            "duskcam",
            "suntable",
            "--lat",
            "-33.8688",
            "--lon",
            "151.2093",
            "--year",
            "2025",
            "--tz",
            "Australia/Sydney",
            "-o",
            "sydney.json",
            "--save-location",
        ]);
        assert_eq!(
            parsed.action,
            CliAction::SunTable {
                global: GlobalArgs::default(),
                latitude: Some(-33.8688),
                longitude: Some(151.2093),
                year: Some(2025),
                timezone: Some("Australia/Sydney".into()),
                output: Some("sydney.json".into()),
                save_location: true,
            }
        );
    }

    #[test]
    fn test_suntable_needs_both_coordinates() {
        let parsed = ParsedArgs::parse(vec!["duskcam", "table", "--lat", "48.85"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);

        let parsed = ParsedArgs::parse(vec!["duskcam", "table", "--lat", "north", "--lon", "2"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_help_command() {
        assert_eq!(
            ParsedArgs::parse(vec!["duskcam", "help"]).action,
            CliAction::Help { command: None }
        );
        assert_eq!(
            ParsedArgs::parse(vec!["duskcam", "help", "simulate"]).action,
            CliAction::Help {
                command: Some("simulate".into())
            }
        );
        assert_eq!(
            ParsedArgs::parse(vec!["duskcam", "help", "run", "status"]).action,
            CliAction::ShowHelpDueToError
        );
    }
}
