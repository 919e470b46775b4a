//! Geocoding adapters.
//!
//! - [`NominatimGeocoder`] resolves addresses and coordinates over HTTP.
//! - [`test_support::StubGeocoder`] answers from in-memory tables.

mod nominatim;
mod provider;
pub mod test_support;

pub use nominatim::{Place, ReverseResponse};
pub use provider::{DEFAULT_USER_AGENT, NominatimGeocoder, NominatimGeocoderConfig};
