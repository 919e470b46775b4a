//! Reverse geocoding command implementation for the HOS CLI.

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use geo::Coord;
use hos_core::{Deadline, GeocodingProvider};
use hos_data::{NominatimGeocoder, NominatimGeocoderConfig};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_LAT, ARG_LON, ARG_NOMINATIM_BASE_URL, ARG_TIMEOUT_SECS, ARG_USER_AGENT, CliError,
    DEFAULT_TIMEOUT_SECS, ENV_REVERSE_LAT, ENV_REVERSE_LON, write_json,
};

const MAX_LATITUDE: f64 = 90.0;
const MAX_LONGITUDE: f64 = 180.0;

/// CLI arguments for the `reverse` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "reverse",
    long_about = "Ask Nominatim for the address nearest to a coordinate, the \
                 same lookup used to label rest areas and fuel stations.",
    about = "Look up the address at a coordinate"
)]
#[ortho_config(prefix = "HOS")]
pub(crate) struct ReverseArgs {
    /// Latitude in decimal degrees.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude in decimal degrees.
    #[arg(long = ARG_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Base URL for the Nominatim server.
    #[arg(long = ARG_NOMINATIM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) nominatim_base_url: Option<String>,
    /// User agent sent to Nominatim.
    #[arg(long = ARG_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
    /// Lookup deadline in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl ReverseArgs {
    pub(crate) fn into_config(self) -> Result<ReverseConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ReverseConfig::try_from(merged)
    }
}

/// Resolved `reverse` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReverseConfig {
    pub(crate) location: Coord<f64>,
    pub(crate) nominatim_base_url: String,
    pub(crate) user_agent: Option<String>,
    pub(crate) timeout: Duration,
}

impl TryFrom<ReverseArgs> for ReverseConfig {
    type Error = CliError;

    fn try_from(args: ReverseArgs) -> Result<Self, Self::Error> {
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_REVERSE_LAT,
        })?;
        let lon = args.lon.ok_or(CliError::MissingArgument {
            field: ARG_LON,
            env: ENV_REVERSE_LON,
        })?;
        check_range(ARG_LAT, lat, MAX_LATITUDE)?;
        check_range(ARG_LON, lon, MAX_LONGITUDE)?;

        let default_base_url = NominatimGeocoderConfig::default().base_url;
        Ok(Self {
            location: Coord { x: lon, y: lat },
            nominatim_base_url: args.nominatim_base_url.unwrap_or(default_base_url),
            user_agent: args.user_agent,
            timeout: Duration::from_secs(args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

fn check_range(field: &'static str, value: f64, limit: f64) -> Result<(), CliError> {
    if value.is_finite() && value.abs() <= limit {
        Ok(())
    } else {
        Err(CliError::CoordinateOutOfRange {
            field,
            value,
            limit,
        })
    }
}

/// Printed result of a reverse lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ReverseOutput {
    pub(crate) lat: f64,
    pub(crate) lon: f64,
    pub(crate) display_name: String,
}

/// Build a Nominatim geocoder, optionally overriding its user agent.
pub(crate) fn build_geocoder(
    base_url: &str,
    user_agent: Option<&str>,
) -> Result<NominatimGeocoder, CliError> {
    let config = NominatimGeocoderConfig::new(base_url);
    let config = match user_agent {
        Some(agent) => config.with_user_agent(agent),
        None => config,
    };
    NominatimGeocoder::with_config(config).map_err(|source| CliError::BuildGeocoder {
        base_url: base_url.to_owned(),
        source,
    })
}

/// Builds the geocoder for the current reverse invocation.
pub(crate) trait GeocoderBuilder {
    fn build(&self, config: &ReverseConfig) -> Result<Box<dyn GeocodingProvider>, CliError>;
}

pub(crate) struct DefaultGeocoderBuilder;

impl GeocoderBuilder for DefaultGeocoderBuilder {
    fn build(&self, config: &ReverseConfig) -> Result<Box<dyn GeocodingProvider>, CliError> {
        let geocoder = build_geocoder(&config.nominatim_base_url, config.user_agent.as_deref())?;
        Ok(Box::new(geocoder))
    }
}

pub(crate) fn run_reverse(args: ReverseArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_reverse_with(args, &DefaultGeocoderBuilder, &mut stdout)
}

pub(crate) fn run_reverse_with(
    args: ReverseArgs,
    builder: &dyn GeocoderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let geocoder = builder.build(&config)?;
    let deadline = Deadline::after(config.timeout);
    let display_name = geocoder
        .reverse(config.location, &deadline)
        .map_err(CliError::Reverse)?;
    write_json(
        writer,
        &ReverseOutput {
            lat: config.location.y,
            lon: config.location.x,
            display_name,
        },
    )
}
