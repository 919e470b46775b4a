//! Routing adapters.
//!
//! - [`OsrmRoutingProvider`] fetches driving legs from an OSRM Route service.
//! - [`test_support::StubRoutingProvider`] returns canned legs for tests.

mod osrm;
mod provider;
pub mod test_support;

pub use osrm::{Maneuver, Route, RouteLegBody, RouteResponse, RouteStepBody};
pub use provider::{DEFAULT_USER_AGENT, OsrmRoutingProvider, OsrmRoutingProviderConfig};
