//! Network and storage collaborators for the hours-of-service planner.
//!
//! Responsibilities:
//! - Route legs through an OSRM Route service.
//! - Resolve addresses and coordinates through Nominatim.
//! - Persist driver hours, trips, stops and duty logs in SQLite.
//!
//! Boundaries:
//! - Do not encode regulatory rules (live in `hos-core`).
//! - Keep blocking calls bounded by the caller's deadline.
//!
//! Invariants:
//! - Thread-safe by default where feasible.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod geocoding;
mod http;
pub mod routing;
pub mod store;

pub use geocoding::{NominatimGeocoder, NominatimGeocoderConfig};
pub use http::ProviderBuildError;
pub use routing::{OsrmRoutingProvider, OsrmRoutingProviderConfig};
pub use store::{SqliteHosStore, SqliteStoreError};
