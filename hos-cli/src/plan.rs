//! Plan command implementation for the HOS CLI.

use std::io::Write;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use hos_core::{
    Deadline, PlanError, PlanRequest, PlannedTrip, RoutePlanner, SystemClock, TripPlanner,
    TripService,
};
use hos_data::{NominatimGeocoderConfig, OsrmRoutingProvider, OsrmRoutingProviderConfig};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::records::{non_blank, open_store};
use crate::reverse::build_geocoder;
use crate::{
    ARG_CURRENT_LOCATION, ARG_DATABASE, ARG_DRIVER, ARG_DROPOFF_LOCATION, ARG_NOMINATIM_BASE_URL,
    ARG_OSRM_BASE_URL, ARG_PICKUP_LOCATION, ARG_TIMEOUT_SECS, ARG_USER_AGENT, CliError,
    DEFAULT_DATABASE, DEFAULT_OSRM_BASE_URL, DEFAULT_TIMEOUT_SECS, ENV_PLAN_CURRENT_LOCATION,
    ENV_PLAN_DRIVER, ENV_PLAN_DROPOFF_LOCATION, ENV_PLAN_PICKUP_LOCATION, write_json,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "plan",
    long_about = "Geocode the three addresses, fetch both legs from OSRM, \
                 insert the breaks, fuel stops and overnight resets the \
                 driver's remaining hours require, then store the trip and \
                 update the driver's usage. The accepted plan is printed as \
                 JSON.",
    about = "Plan a trip for a driver"
)]
#[ortho_config(prefix = "HOS")]
pub(crate) struct PlanArgs {
    /// SQLite database holding drivers' hours and trips.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Driver whose hours the trip is charged to.
    #[arg(long = ARG_DRIVER, value_name = "id")]
    #[serde(default)]
    pub(crate) driver: Option<String>,
    /// Where the driver is now.
    #[arg(long = ARG_CURRENT_LOCATION, value_name = "address")]
    #[serde(default)]
    pub(crate) current_location: Option<String>,
    /// Where the load is collected.
    #[arg(long = ARG_PICKUP_LOCATION, value_name = "address")]
    #[serde(default)]
    pub(crate) pickup_location: Option<String>,
    /// Where the load is delivered.
    #[arg(long = ARG_DROPOFF_LOCATION, value_name = "address")]
    #[serde(default)]
    pub(crate) dropoff_location: Option<String>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Base URL for the Nominatim server.
    #[arg(long = ARG_NOMINATIM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) nominatim_base_url: Option<String>,
    /// User agent sent to both services.
    #[arg(long = ARG_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
    /// Overall planning deadline in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanConfig {
    /// Path to the SQLite store.
    pub(crate) database: Utf8PathBuf,
    /// Driver the trip is planned for.
    pub(crate) driver: String,
    /// The three addresses.
    pub(crate) request: PlanRequest,
    /// Base URL for the OSRM route service.
    pub(crate) osrm_base_url: String,
    /// Base URL for the Nominatim service.
    pub(crate) nominatim_base_url: String,
    /// Overrides the providers' default user agents.
    pub(crate) user_agent: Option<String>,
    /// Deadline for the whole planning cycle.
    pub(crate) timeout: Duration,
}

impl PlanConfig {
    fn routing_config(&self) -> OsrmRoutingProviderConfig {
        let config = OsrmRoutingProviderConfig::new(self.osrm_base_url.clone());
        match &self.user_agent {
            Some(agent) => config.with_user_agent(agent.clone()),
            None => config,
        }
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let driver = non_blank(args.driver).ok_or(CliError::MissingArgument {
            field: ARG_DRIVER,
            env: ENV_PLAN_DRIVER,
        })?;
        let current_location = args.current_location.ok_or(CliError::MissingArgument {
            field: ARG_CURRENT_LOCATION,
            env: ENV_PLAN_CURRENT_LOCATION,
        })?;
        let pickup_location = args.pickup_location.ok_or(CliError::MissingArgument {
            field: ARG_PICKUP_LOCATION,
            env: ENV_PLAN_PICKUP_LOCATION,
        })?;
        let dropoff_location = args.dropoff_location.ok_or(CliError::MissingArgument {
            field: ARG_DROPOFF_LOCATION,
            env: ENV_PLAN_DROPOFF_LOCATION,
        })?;

        let default_nominatim = NominatimGeocoderConfig::default().base_url;
        Ok(Self {
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            driver,
            request: PlanRequest::new(current_location, pickup_location, dropoff_location),
            osrm_base_url: args
                .osrm_base_url
                .unwrap_or_else(|| DEFAULT_OSRM_BASE_URL.to_owned()),
            nominatim_base_url: args.nominatim_base_url.unwrap_or(default_nominatim),
            user_agent: args.user_agent,
            timeout: Duration::from_secs(args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

/// Builds the trip service for the current plan invocation.
pub(crate) trait TripServiceBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn TripService>, CliError>;
}

pub(crate) struct DefaultTripServiceBuilder;

impl TripServiceBuilder for DefaultTripServiceBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn TripService>, CliError> {
        let routing = OsrmRoutingProvider::with_config(config.routing_config()).map_err(|source| {
            CliError::BuildRoutingProvider {
                base_url: config.osrm_base_url.clone(),
                source,
            }
        })?;
        let geocoder = build_geocoder(&config.nominatim_base_url, config.user_agent.as_deref())?;
        let store = open_store(&config.database)?;
        let routes = RoutePlanner::new(routing, geocoder, SystemClock);
        Ok(Box::new(TripPlanner::new(routes, store)))
    }
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_plan_with(args, &DefaultTripServiceBuilder, &mut stdout)
}

pub(crate) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn TripServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let planned = execute_plan(args, builder)?;
    write_json(writer, &planned)
}

fn execute_plan(
    args: PlanArgs,
    builder: &dyn TripServiceBuilder,
) -> Result<PlannedTrip, CliError> {
    let config = args.into_config()?;
    // Reject bad addresses before any service or database is touched.
    config.request.validate().map_err(PlanError::from)?;
    let service = builder.build(&config)?;
    let deadline = Deadline::after(config.timeout);
    let planned = service.plan_trip(&config.driver, &config.request, &deadline)?;
    Ok(planned)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
