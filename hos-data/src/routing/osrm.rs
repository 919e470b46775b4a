//! OSRM API response types for the Route service.
//!
//! Only the fields the planner consumes are modelled: the route totals and
//! the per-step distance, road name and manoeuvre coordinate used to label
//! stops.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route between the coordinates
    /// - `"InvalidQuery"` - Invalid query parameters
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, best first. Absent on failure.
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }

    /// Check if OSRM reported that no route exists.
    #[must_use]
    pub fn is_no_route(&self) -> bool {
        self.code == "NoRoute"
    }
}

/// A routed path between the requested waypoints.
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Distance in metres.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// One leg per consecutive waypoint pair.
    #[serde(default)]
    pub legs: Vec<RouteLegBody>,
}

/// A leg of an OSRM route.
#[derive(Debug, Deserialize)]
pub struct RouteLegBody {
    /// Turn-by-turn steps; empty unless `steps=true` was requested.
    #[serde(default)]
    pub steps: Vec<RouteStepBody>,
}

/// One manoeuvre along a leg.
#[derive(Debug, Deserialize)]
pub struct RouteStepBody {
    /// Distance covered by this step in metres.
    pub distance: f64,
    /// Road name; empty for unnamed roads.
    #[serde(default)]
    pub name: String,
    /// Where the manoeuvre takes place.
    pub maneuver: Maneuver,
}

/// Manoeuvre metadata.
#[derive(Debug, Deserialize)]
pub struct Maneuver {
    /// `[longitude, latitude]`.
    pub location: [f64; 2],
}
