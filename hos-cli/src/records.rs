//! `hours` and `trips` commands: read-only views of the SQLite store.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use clap::Parser;
use hos_core::{
    Clock, DEFAULT_RECENT_TRIPS, HoursOfServiceState, HoursOfServiceStore, SystemClock,
    TripPlanStore,
};
use hos_data::SqliteHosStore;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_DATE, ARG_DRIVER, ARG_LIMIT, CliError, DEFAULT_DATABASE, ENV_HOURS_DRIVER,
    ENV_TRIPS_DRIVER, write_json,
};

/// CLI arguments for the `hours` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "hours",
    long_about = "Print the driver's cycle, daily and driving usage for a \
                 day. A zeroed record is created when the driver has none \
                 for that day.",
    about = "Show a driver's usage"
)]
#[ortho_config(prefix = "HOS")]
pub(crate) struct HoursArgs {
    /// SQLite database holding drivers' hours and trips.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Driver to report on.
    #[arg(long = ARG_DRIVER, value_name = "id")]
    #[serde(default)]
    pub(crate) driver: Option<String>,
    /// Day to report on (YYYY-MM-DD); defaults to today.
    #[arg(long = ARG_DATE, value_name = "date")]
    #[serde(default)]
    pub(crate) date: Option<NaiveDate>,
}

impl HoursArgs {
    pub(crate) fn into_config(self) -> Result<HoursConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        HoursConfig::try_from(merged)
    }
}

/// Resolved `hours` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HoursConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) driver: String,
    /// `None` means the clock's current day.
    pub(crate) date: Option<NaiveDate>,
}

impl TryFrom<HoursArgs> for HoursConfig {
    type Error = CliError;

    fn try_from(args: HoursArgs) -> Result<Self, Self::Error> {
        let driver = non_blank(args.driver).ok_or(CliError::MissingArgument {
            field: ARG_DRIVER,
            env: ENV_HOURS_DRIVER,
        })?;
        Ok(Self {
            database: database_or_default(args.database),
            driver,
            date: args.date,
        })
    }
}

/// CLI arguments for the `trips` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "trips",
    long_about = "Print summaries of the driver's most recently planned \
                 trips, newest first.",
    about = "List a driver's recent trips"
)]
#[ortho_config(prefix = "HOS")]
pub(crate) struct TripsArgs {
    /// SQLite database holding drivers' hours and trips.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Driver to report on.
    #[arg(long = ARG_DRIVER, value_name = "id")]
    #[serde(default)]
    pub(crate) driver: Option<String>,
    /// Maximum number of trips to list.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

impl TripsArgs {
    pub(crate) fn into_config(self) -> Result<TripsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TripsConfig::try_from(merged)
    }
}

/// Resolved `trips` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TripsConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) driver: String,
    pub(crate) limit: usize,
}

impl TryFrom<TripsArgs> for TripsConfig {
    type Error = CliError;

    fn try_from(args: TripsArgs) -> Result<Self, Self::Error> {
        let driver = non_blank(args.driver).ok_or(CliError::MissingArgument {
            field: ARG_DRIVER,
            env: ENV_TRIPS_DRIVER,
        })?;
        Ok(Self {
            database: database_or_default(args.database),
            driver,
            limit: args.limit.unwrap_or(DEFAULT_RECENT_TRIPS),
        })
    }
}

/// Usage for one day plus the advisory limit checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct HoursReport {
    #[serde(flatten)]
    pub(crate) hours: HoursOfServiceState,
    pub(crate) over_daily_limit: bool,
    pub(crate) over_cycle_limit: bool,
}

impl From<HoursOfServiceState> for HoursReport {
    fn from(hours: HoursOfServiceState) -> Self {
        Self {
            over_daily_limit: hours.is_over_daily_limit(),
            over_cycle_limit: hours.is_over_cycle_limit(),
            hours,
        }
    }
}

/// Open the store at `path`, creating the database if needed.
pub(crate) fn open_store(path: &Utf8Path) -> Result<SqliteHosStore, CliError> {
    SqliteHosStore::open(path).map_err(|source| CliError::OpenStore {
        path: path.to_path_buf(),
        source,
    })
}

/// Treat blank identifiers the same as absent ones.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn database_or_default(database: Option<Utf8PathBuf>) -> Utf8PathBuf {
    database.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE))
}

pub(crate) fn run_hours(args: HoursArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_hours_with(args, &SystemClock, &mut stdout)
}

pub(crate) fn run_hours_with(
    args: HoursArgs,
    clock: &dyn Clock,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = open_store(&config.database)?;
    let date = config.date.unwrap_or_else(|| clock.now().date());
    let hours = store
        .load_hours(&config.driver, date)
        .map_err(|source| CliError::Store {
            operation: "load hours of service",
            source,
        })?;
    write_json(writer, &HoursReport::from(hours))
}

pub(crate) fn run_trips(args: TripsArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_trips_with(args, &mut stdout)
}

pub(crate) fn run_trips_with(args: TripsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = open_store(&config.database)?;
    let trips = store
        .recent_trips(&config.driver, config.limit)
        .map_err(|source| CliError::Store {
            operation: "list recent trips",
            source,
        })?;
    write_json(writer, &trips)
}
