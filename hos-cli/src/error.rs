//! Error types emitted by the HOS CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use hos_core::{GeocodingError, PlanError};
use hos_data::{ProviderBuildError, SqliteStoreError};
use thiserror::Error;

/// Errors emitted by the HOS CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A coordinate option lies outside its valid range.
    #[error("{field} {value} is outside [-{limit}, {limit}]")]
    CoordinateOutOfRange {
        field: &'static str,
        value: f64,
        limit: f64,
    },
    /// Constructing the OSRM routing provider failed.
    #[error("failed to build routing provider for {base_url:?}: {source}")]
    BuildRoutingProvider {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// Constructing the Nominatim geocoder failed.
    #[error("failed to build geocoder for {base_url:?}: {source}")]
    BuildGeocoder {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// Opening the SQLite store failed.
    #[error("failed to open store at {path:?}: {source}")]
    OpenStore {
        path: Utf8PathBuf,
        #[source]
        source: SqliteStoreError,
    },
    /// Reading from the store failed.
    #[error("failed to {operation}: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: SqliteStoreError,
    },
    /// Planning the trip failed.
    #[error("planning failed: {0}")]
    Plan(#[from] PlanError),
    /// The reverse lookup failed.
    #[error("reverse lookup failed: {0}")]
    Reverse(#[source] GeocodingError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
