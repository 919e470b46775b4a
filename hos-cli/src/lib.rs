//! Command-line interface for planning Hours-of-Service compliant trips.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Serialize;

mod error;
mod plan;
mod records;
mod reverse;

pub use error::CliError;

use plan::{PlanArgs, run_plan};
use records::{HoursArgs, TripsArgs, run_hours, run_trips};
use reverse::{ReverseArgs, run_reverse};

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_DRIVER: &str = "driver";
pub(crate) const ARG_CURRENT_LOCATION: &str = "current-location";
pub(crate) const ARG_PICKUP_LOCATION: &str = "pickup-location";
pub(crate) const ARG_DROPOFF_LOCATION: &str = "dropoff-location";
pub(crate) const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_NOMINATIM_BASE_URL: &str = "nominatim-base-url";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_USER_AGENT: &str = "user-agent";
pub(crate) const ARG_DATE: &str = "date";
pub(crate) const ARG_LIMIT: &str = "limit";
pub(crate) const ARG_LAT: &str = "lat";
pub(crate) const ARG_LON: &str = "lon";

pub(crate) const ENV_PLAN_DRIVER: &str = "HOS_CMDS_PLAN_DRIVER";
pub(crate) const ENV_PLAN_CURRENT_LOCATION: &str = "HOS_CMDS_PLAN_CURRENT_LOCATION";
pub(crate) const ENV_PLAN_PICKUP_LOCATION: &str = "HOS_CMDS_PLAN_PICKUP_LOCATION";
pub(crate) const ENV_PLAN_DROPOFF_LOCATION: &str = "HOS_CMDS_PLAN_DROPOFF_LOCATION";
pub(crate) const ENV_HOURS_DRIVER: &str = "HOS_CMDS_HOURS_DRIVER";
pub(crate) const ENV_TRIPS_DRIVER: &str = "HOS_CMDS_TRIPS_DRIVER";
pub(crate) const ENV_REVERSE_LAT: &str = "HOS_CMDS_REVERSE_LAT";
pub(crate) const ENV_REVERSE_LON: &str = "HOS_CMDS_REVERSE_LON";

/// Database used when `--database` is not supplied.
pub(crate) const DEFAULT_DATABASE: &str = "hos.db";
/// Public OSRM demo server.
pub(crate) const DEFAULT_OSRM_BASE_URL: &str = "https://router.project-osrm.org";
/// Overall planning deadline when `--timeout-secs` is not supplied.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Run the HOS CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] describing the first failure: argument parsing,
/// configuration layering, collaborator construction, the command itself or
/// writing its JSON output.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Plan(args) => run_plan(args),
        Command::Hours(args) => run_hours(args),
        Command::Trips(args) => run_trips(args),
        Command::Reverse(args) => run_reverse(args),
    }
}

/// Pretty-print `value` as JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "hos",
    about = "Plan truck trips that respect Hours-of-Service limits",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan, store and account for a trip.
    Plan(PlanArgs),
    /// Show a driver's recorded usage for a day.
    Hours(HoursArgs),
    /// List a driver's most recent trips.
    Trips(TripsArgs),
    /// Look up the address nearest to a coordinate.
    Reverse(ReverseArgs),
}

#[cfg(test)]
mod tests;
