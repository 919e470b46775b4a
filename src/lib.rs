//! Facade crate for the Hours-of-Service trip planner.
//!
//! This crate re-exports the core domain types and the segmentation engine,
//! and exposes the OSRM, Nominatim and SQLite collaborators behind the `data`
//! feature.

#![forbid(unsafe_code)]

pub use hos_core::{
    Clock, Deadline, DutyActivity, DutyStatus, GeocodingError, GeocodingProvider, HoursDelta,
    HoursOfServiceState, HoursOfServiceStore, Interrupted, PlanError, PlanRequest, PlannedTrip,
    RouteLeg, RoutePlanner, RouteStep, RoutingError, RoutingProvider, SegmentationEngine, Stop,
    StopLocator, StopType, SystemClock, TimeFormatter, TripLegs, TripPlan, TripPlanStore,
    TripPlanner, TripService, TripSummary,
};

#[cfg(feature = "data")]
pub use hos_data::{
    NominatimGeocoder, NominatimGeocoderConfig, OsrmRoutingProvider, OsrmRoutingProviderConfig,
    ProviderBuildError, SqliteHosStore, SqliteStoreError,
};
