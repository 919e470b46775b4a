//! Core domain types and the Hours-of-Service segmentation engine.
//!
//! Given two routed legs and a driver's accumulated duty-time usage, the
//! [`SegmentationEngine`] produces the ordered stops (breaks, fuel stops,
//! overnight resets, pickup and dropoff) that keep the trip within the
//! driving, duty and cycle limits. Routing, geocoding and persistence are
//! collaborator traits implemented elsewhere; [`RoutePlanner`] and
//! [`TripPlanner`] wire them around the engine.

#![forbid(unsafe_code)]

mod clock;
mod deadline;
pub mod engine;
mod error;
pub mod geocoding;
mod hours;
mod locator;
mod plan;
mod planner;
mod request;
mod route;
pub mod routing;
mod stop;
mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, LABEL_FORMAT, SystemClock, TimeFormatter};
pub use deadline::{Deadline, Interrupted};
pub use engine::{SegmentationEngine, TripLegs};
pub use error::{PlanError, StoreError};
pub use geocoding::{GeocodingError, GeocodingProvider};
pub use hours::{HoursDelta, HoursOfServiceState};
pub use locator::{StopLocator, generic_label, step_at_ratio};
pub use plan::{DutyActivity, TripPlan};
pub use planner::{DriverLocks, PlannedTrip, RoutePlanner, TripPlanner, TripService};
pub use request::{MAX_ADDRESS_LEN, PlanRequest, PlanRequestValidationError};
pub use route::{RouteLeg, RouteStep};
pub use routing::{RoutingError, RoutingProvider};
pub use stop::{DutyStatus, Stop, StopType};
pub use store::{
    DEFAULT_RECENT_TRIPS, HoursOfServiceStore, TripId, TripPlanStore, TripSummary,
};
