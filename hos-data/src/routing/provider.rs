//! HTTP-based `RoutingProvider` using OSRM's Route API.
//!
//! This module provides [`OsrmRoutingProvider`], an implementation of the
//! [`RoutingProvider`] trait that fetches a driving route between two
//! coordinates from an OSRM service.
//!
//! # Example
//!
//! ```no_run
//! use geo::Coord;
//! use hos_core::{Deadline, RoutingProvider};
//! use hos_data::routing::OsrmRoutingProvider;
//!
//! let provider = OsrmRoutingProvider::new("http://localhost:5000")?;
//! let leg = provider.route_between(
//!     Coord { x: -87.63, y: 41.88 },
//!     Coord { x: -86.78, y: 36.16 },
//!     &Deadline::unbounded(),
//! )?;
//! println!("{:.1} miles", leg.distance_miles);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use geo::Coord;
use hos_core::{Deadline, RouteLeg, RouteStep, RoutingError, RoutingProvider};
use log::debug;
use url::Url;

use super::osrm::RouteResponse;
use crate::http::{BlockingHttp, ProviderBuildError, RequestFailure, parse_base_url};

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "hos-planner-routing/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const METRES_PER_MILE: f64 = 1609.34;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Configuration for [`OsrmRoutingProvider`].
#[derive(Debug, Clone)]
pub struct OsrmRoutingProviderConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Request timeout duration, further capped by each call's deadline.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OsrmRoutingProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OsrmRoutingProviderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Driving-route provider backed by the OSRM Route API.
///
/// Each call issues a single `route/v1/driving` request with step hints
/// enabled. Distances are converted to miles and durations to hours; step
/// distances are accumulated so every [`RouteStep`] carries the miles
/// travelled from the leg origin to the end of that step.
#[derive(Debug)]
pub struct OsrmRoutingProvider {
    http: BlockingHttp,
    base_url: Url,
    config: OsrmRoutingProviderConfig,
}

impl OsrmRoutingProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OsrmRoutingProviderConfig::new(base_url))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: OsrmRoutingProviderConfig) -> Result<Self, ProviderBuildError> {
        let base_url = parse_base_url(&config.base_url)?;
        let http = BlockingHttp::new(&config.user_agent, config.timeout)?;
        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Build the Route API URL.
    ///
    /// The format is
    /// `{base_url}/route/v1/driving/{lon},{lat};{lon},{lat}?steps=true&overview=false&alternatives=false`.
    fn build_route_url(&self, origin: Coord<f64>, destination: Coord<f64>) -> Url {
        let waypoints = format!(
            "{},{};{},{}",
            origin.x, origin.y, destination.x, destination.y
        );
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["route", "v1", "driving", waypoints.as_str()]);
        }
        url.query_pairs_mut()
            .append_pair("steps", "true")
            .append_pair("overview", "false")
            .append_pair("alternatives", "false");
        url
    }

    async fn fetch_route(&self, url: &Url, timeout: Duration) -> Result<RouteResponse, RoutingError> {
        let response = self
            .http
            .client()
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| convert_reqwest_error(&err, url, timeout))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| convert_reqwest_error(&err, url, timeout))?;

        // OSRM reports NoRoute and InvalidQuery with a 400 and a JSON body.
        match serde_json::from_slice::<RouteResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(err) if status.is_success() => Err(RoutingError::Parse {
                message: err.to_string(),
            }),
            Err(_) => Err(RoutingError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_owned(),
            }),
        }
    }
}

/// Convert a reqwest error to a `RoutingError`.
fn convert_reqwest_error(error: &reqwest::Error, url: &Url, timeout: Duration) -> RoutingError {
    match RequestFailure::of(error) {
        RequestFailure::Timeout => RoutingError::Timeout {
            url: url.to_string(),
            timeout_secs: timeout.as_secs(),
        },
        RequestFailure::Status(status) => RoutingError::Http {
            url: url.to_string(),
            status,
            message: error.to_string(),
        },
        RequestFailure::Network => RoutingError::Network {
            url: url.to_string(),
            message: error.to_string(),
        },
    }
}

/// Convert an OSRM response to a [`RouteLeg`].
fn convert_response(
    response: RouteResponse,
    origin: Coord<f64>,
    destination: Coord<f64>,
) -> Result<RouteLeg, RoutingError> {
    if response.is_no_route() {
        return Err(RoutingError::NoRoute);
    }
    if !response.is_ok() {
        return Err(RoutingError::Service {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(RoutingError::NoRoute)?;
    if !(route.distance.is_finite() && route.distance >= 0.0)
        || !(route.duration.is_finite() && route.duration >= 0.0)
    {
        return Err(RoutingError::Parse {
            message: format!(
                "route totals must be finite and non-negative (distance {}, duration {})",
                route.distance, route.duration
            ),
        });
    }

    let mut travelled = 0.0;
    let steps = route
        .legs
        .into_iter()
        .flat_map(|leg| leg.steps)
        .map(|step| {
            travelled += step.distance.max(0.0) / METRES_PER_MILE;
            let [lon, lat] = step.maneuver.location;
            RouteStep {
                cumulative_miles: travelled,
                name: Some(step.name).filter(|name| !name.trim().is_empty()),
                location: Some(Coord { x: lon, y: lat }),
            }
        })
        .collect();

    Ok(RouteLeg::new(
        origin,
        destination,
        route.distance / METRES_PER_MILE,
        route.duration / SECONDS_PER_HOUR,
    )
    .with_steps(steps))
}

impl RoutingProvider for OsrmRoutingProvider {
    /// Fetch the driving route between two coordinates.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded (`flavor = "multi_thread"`).
    fn route_between(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
        deadline: &Deadline,
    ) -> Result<RouteLeg, RoutingError> {
        let timeout = deadline.budget(self.config.timeout)?;
        let url = self.build_route_url(origin, destination);
        debug!("requesting OSRM route {url}");

        let response = self
            .http
            .run(deadline, self.fetch_route(&url, timeout))?
            .map_err(|err| match err {
                // A timeout caused by the shrinking budget is the deadline's.
                RoutingError::Timeout { .. } => deadline
                    .check()
                    .map_or_else(RoutingError::Interrupted, |()| err),
                other => other,
            })?;
        convert_response(response, origin, destination)
    }
}
