//! Persistence collaborator traits.
//!
//! The engine never persists anything itself. [`TripPlanner`](crate::TripPlanner)
//! loads a driver's [`HoursOfServiceState`] through [`HoursOfServiceStore`]
//! and hands the accepted plan and the updated hours to
//! [`TripPlanStore::save_trip_with_hours`], which writes both or neither.

use chrono::{NaiveDate, NaiveDateTime};

use crate::{HoursOfServiceState, PlanRequest, TripPlan};

/// Identifier assigned to a stored trip.
pub type TripId = i64;

/// Number of trips listed when the caller does not ask for a specific count.
pub const DEFAULT_RECENT_TRIPS: usize = 5;

/// Compact view of a stored trip.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripSummary {
    /// Store-assigned identifier.
    pub id: TripId,
    /// Driver the trip was planned for.
    pub driver: String,
    /// Addresses the trip was planned between.
    pub request: PlanRequest,
    /// Total miles, rounded to one decimal.
    pub total_distance: f64,
    /// Total driving hours, rounded to one decimal.
    pub total_driving_hours: f64,
    /// Wall-clock trip hours, rounded to one decimal.
    pub total_trip_hours: f64,
    /// Stops between START and the final stop.
    pub required_stop_count: usize,
    /// When the trip was stored.
    pub created_at: NaiveDateTime,
}

/// Per-driver, per-day duty-time usage.
pub trait HoursOfServiceStore {
    /// Backend failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load usage for `driver` on `date`, creating a zeroed record if none
    /// exists.
    fn load_hours(&self, driver: &str, date: NaiveDate)
    -> Result<HoursOfServiceState, Self::Error>;

    /// Replace the stored usage for the record's driver and date.
    fn save_hours(&self, hours: &HoursOfServiceState) -> Result<(), Self::Error>;
}

/// Durable trip, stop and duty-log records.
pub trait TripPlanStore {
    /// Backend failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store an accepted plan and its derived duty log.
    fn save_trip_plan(
        &self,
        driver: &str,
        request: &PlanRequest,
        plan: &TripPlan,
    ) -> Result<TripId, Self::Error>;

    /// Store an accepted plan together with the driver's updated usage.
    ///
    /// Both writes succeed or neither is visible afterwards.
    fn save_trip_with_hours(
        &self,
        driver: &str,
        request: &PlanRequest,
        plan: &TripPlan,
        hours: &HoursOfServiceState,
    ) -> Result<TripId, Self::Error>;

    /// Most recent trips for `driver`, newest first.
    fn recent_trips(&self, driver: &str, limit: usize) -> Result<Vec<TripSummary>, Self::Error>;
}
