//! Suntable command: compute the yearly sunrise/sunset table for a location.
//!
//! Coordinates and timezone come from the command line or, when omitted,
//! from the configuration. The table is written to the configured
//! `sun_table` path unless `--output` says otherwise.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::sync::Arc;

use super::CommandContext;
use crate::args::GlobalArgs;
use crate::common::utils::private_path;
use crate::config::{builder::update_location, get_config_path};
use crate::sun::{SunTimesProvider, TableRequest, generate_table};
use crate::time_source::{self, RealTimeSource};

/// Options of the suntable command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SunTableArgs {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub year: Option<i32>,
    pub timezone: Option<String>,
    pub output: Option<String>,
    /// Write the coordinates and timezone back into the config file
    pub save_location: bool,
}

pub fn handle_suntable_command(global: &GlobalArgs, args: SunTableArgs) -> Result<()> {
    time_source::init_time_source(Arc::new(RealTimeSource));
    let ctx = CommandContext::prepare(global)?;
    let config = &ctx.config;

    log_version!();

    let (latitude, longitude) = match (args.latitude, args.longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => match (config.latitude, config.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => anyhow::bail!(
                "No location given. Use --lat and --lon, or set latitude and longitude in {}",
                private_path(&get_config_path()?)
            ),
        },
    };

    let timezone_name = args.timezone.clone().or_else(|| config.timezone.clone());
    let timezone = timezone_name
        .as_deref()
        .map(|name| {
            name.parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("Unknown timezone '{name}'"))
        })
        .transpose()?;

    let year = args.year.unwrap_or_else(|| time_source::now().year());
    let output = match &args.output {
        Some(path) => PathBuf::from(path),
        None => config.sun_table_path(),
    };

    log_block_start!("Computing sun times for {}", year);
    log_indented!("Location: {:.4}, {:.4}", latitude, longitude);
    log_indented!(
        "Timezone: {}",
        timezone_name.as_deref().unwrap_or("system local time")
    );

    let table = generate_table(&TableRequest {
        latitude,
        longitude,
        year,
        timezone,
    })?;
    table.save(&output)?;

    log_block_start!("Wrote {} entries to {}", table.len(), private_path(&output));
    let polar_days = table.polar_days();
    if polar_days > 0 {
        log_indented!("{} polar days (sun never rises or never sets)", polar_days);
    }

    // Solstices and equinoxes as a sanity check
    for (month, day) in [(3, 20), (6, 21), (9, 22), (12, 21)] {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day)
            && let Some(times) = table.sun_times(date)
        {
            log_indented!(
                "{}: sunrise {}, sunset {}",
                date.format("%b %d"),
                times.sunrise,
                times.sunset
            );
        }
    }

    if args.save_location {
        update_location(
            &get_config_path()?,
            latitude,
            longitude,
            timezone_name.as_deref(),
        )?;
    }

    log_end!();
    Ok(())
}

/// Display help for the suntable command
pub fn display_help() {
    log_version!();
    log_block_start!("suntable - Generate a sun times table for a location");
    log_block_start!("Usage: duskcam suntable [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("--lat <degrees>         Latitude, north positive (default: config)");
    log_indented!("--lon <degrees>         Longitude, east positive (default: config)");
    log_indented!("--year <year>           Year to compute (default: current year)");
    log_indented!("--timezone <zone>       IANA zone for clock times (default: config or system)");
    log_indented!("-o, --output <path>     Where to write the table (default: sun_table)");
    log_indented!("--save-location         Store the location in the config file");
    log_block_start!("Notes:");
    log_indented!("Days without sunrise or sunset are written as \"never_rises\" or");
    log_indented!("\"never_sets\"; the camera keeps daytime values on those days.");
    log_block_start!("Examples:");
    log_indented!("duskcam suntable --lat 48.8566 --lon 2.3522 --timezone Europe/Paris");
    log_end!();
}
