//! HTTP-based `GeocodingProvider` using Nominatim.
//!
//! Forward lookups call `/search` and take the best match; reverse lookups
//! call `/reverse` and return the place's display name.

use std::time::Duration;

use geo::Coord;
use hos_core::{Deadline, GeocodingError, GeocodingProvider};
use log::debug;
use serde::de::DeserializeOwned;
use url::Url;

use super::nominatim::{Place, ReverseResponse};
use crate::http::{BlockingHttp, ProviderBuildError, RequestFailure, parse_base_url};

/// Default user agent for Nominatim requests.
///
/// The public Nominatim instance rejects requests without an identifying
/// agent.
pub const DEFAULT_USER_AGENT: &str = "hos-planner-geocoding/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`NominatimGeocoder`].
#[derive(Debug, Clone)]
pub struct NominatimGeocoderConfig {
    /// Base URL for the Nominatim service.
    pub base_url: String,
    /// Request timeout duration, further capped by each call's deadline.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for NominatimGeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl NominatimGeocoderConfig {
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

/// Address resolver backed by a Nominatim instance.
#[derive(Debug)]
pub struct NominatimGeocoder {
    http: BlockingHttp,
    base_url: Url,
    config: NominatimGeocoderConfig,
}

impl NominatimGeocoder {
    /// Create a geocoder with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(NominatimGeocoderConfig::new(base_url))
    }

    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: NominatimGeocoderConfig) -> Result<Self, ProviderBuildError> {
        let base_url = parse_base_url(&config.base_url)?;
        let http = BlockingHttp::new(&config.user_agent, config.timeout)?;
        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }

    fn search_url(&self, address: &str) -> Url {
        let mut url = self.endpoint("search");
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("format", "jsonv2")
            .append_pair("limit", "1");
        url
    }

    fn reverse_url(&self, location: Coord<f64>) -> Url {
        let mut url = self.endpoint("reverse");
        url.query_pairs_mut()
            .append_pair("lat", &location.y.to_string())
            .append_pair("lon", &location.x.to_string())
            .append_pair("format", "jsonv2");
        url
    }

    /// Issue a GET and decode the JSON body, honouring `deadline`.
    fn get_json<T: DeserializeOwned>(&self, url: &Url, deadline: &Deadline) -> Result<T, GeocodingError> {
        let timeout = deadline.budget(self.config.timeout)?;
        debug!("requesting Nominatim {url}");
        let request = async {
            self.http
                .client()
                .get(url.clone())
                .timeout(timeout)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|err| convert_reqwest_error(&err, url, timeout))?
                .json::<T>()
                .await
                .map_err(|err| GeocodingError::Parse {
                    message: err.to_string(),
                })
        };
        self.http
            .run(deadline, request)?
            .map_err(|err| match err {
                // A timeout caused by the shrinking budget is the deadline's.
                GeocodingError::Timeout { .. } => deadline
                    .check()
                    .map_or_else(GeocodingError::Interrupted, |()| err),
                other => other,
            })
    }
}

/// Convert a reqwest error to a `GeocodingError`.
fn convert_reqwest_error(error: &reqwest::Error, url: &Url, timeout: Duration) -> GeocodingError {
    match RequestFailure::of(error) {
        RequestFailure::Timeout => GeocodingError::Timeout {
            url: url.to_string(),
            timeout_secs: timeout.as_secs(),
        },
        RequestFailure::Status(status) => GeocodingError::Http {
            url: url.to_string(),
            status,
            message: error.to_string(),
        },
        RequestFailure::Network => GeocodingError::Network {
            url: url.to_string(),
            message: error.to_string(),
        },
    }
}

fn first_coordinate(address: &str, places: Vec<Place>) -> Result<Coord<f64>, GeocodingError> {
    let place = places
        .into_iter()
        .next()
        .ok_or_else(|| GeocodingError::NotFound {
            query: address.to_owned(),
        })?;
    place.coordinate().ok_or_else(|| GeocodingError::Parse {
        message: format!("invalid coordinate ({}, {}) for {address:?}", place.lat, place.lon),
    })
}

fn display_name(location: Coord<f64>, response: ReverseResponse) -> Result<String, GeocodingError> {
    match response {
        ReverseResponse::Found(place) if !place.display_name.trim().is_empty() => {
            Ok(place.display_name)
        }
        ReverseResponse::Found(_) | ReverseResponse::Failed { .. } => {
            Err(GeocodingError::NotFound {
                query: format!("{},{}", location.y, location.x),
            })
        }
    }
}

impl GeocodingProvider for NominatimGeocoder {
    fn forward(&self, address: &str, deadline: &Deadline) -> Result<Coord<f64>, GeocodingError> {
        let url = self.search_url(address);
        let places: Vec<Place> = self.get_json(&url, deadline)?;
        first_coordinate(address, places)
    }

    fn reverse(
        &self,
        location: Coord<f64>,
        deadline: &Deadline,
    ) -> Result<String, GeocodingError> {
        let url = self.reverse_url(location);
        let response: ReverseResponse = self.get_json(&url, deadline)?;
        display_name(location, response)
    }
}
