//! Deterministic collaborators used by unit, behaviour and property tests.
//!
//! None of these touch the network or the filesystem.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use geo::Coord;
use thiserror::Error;

use crate::geocoding::{GeocodingError, GeocodingProvider};
use crate::routing::{RoutingError, RoutingProvider};
use crate::{
    Clock, Deadline, DutyStatus, HoursDelta, HoursOfServiceState, HoursOfServiceStore,
    PlanRequest, RouteLeg, Stop, StopType, TimeFormatter, TripId, TripLegs, TripPlan,
    TripPlanStore, TripSummary,
};

/// [`Clock`] frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Freeze the clock at the given local date and time.
    ///
    /// Out-of-range components fall back to the Unix epoch.
    #[must_use]
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self(
            NaiveDate::from_ymd_opt(year, month, day)
                .and_then(|date| date.and_hms_opt(hour, minute, 0))
                .unwrap_or_default(),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// [`RoutingProvider`] returning preconfigured legs.
///
/// Legs are matched on exact origin and destination.
#[derive(Debug, Clone, Default)]
pub struct FixedRoutingProvider {
    legs: Vec<RouteLeg>,
}

impl FixedRoutingProvider {
    /// Serve `legs`.
    #[must_use]
    pub const fn new(legs: Vec<RouteLeg>) -> Self {
        Self { legs }
    }
}

impl RoutingProvider for FixedRoutingProvider {
    fn route_between(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
        deadline: &Deadline,
    ) -> Result<RouteLeg, RoutingError> {
        deadline.check()?;
        self.legs
            .iter()
            .find(|leg| leg.origin == origin && leg.destination == destination)
            .cloned()
            .ok_or(RoutingError::NoRoute)
    }
}

/// [`GeocodingProvider`] backed by in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct FixedGeocoder {
    addresses: HashMap<String, Coord<f64>>,
    places: Vec<(Coord<f64>, String)>,
}

impl FixedGeocoder {
    /// An empty geocoder that resolves nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `address` to `location`.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>, location: Coord<f64>) -> Self {
        self.addresses.insert(address.into(), location);
        self
    }

    /// Reverse-resolve `location` to `name`.
    #[must_use]
    pub fn with_place(mut self, location: Coord<f64>, name: impl Into<String>) -> Self {
        self.places.push((location, name.into()));
        self
    }
}

impl GeocodingProvider for FixedGeocoder {
    fn forward(&self, address: &str, deadline: &Deadline) -> Result<Coord<f64>, GeocodingError> {
        deadline.check()?;
        self.addresses
            .get(address)
            .copied()
            .ok_or_else(|| GeocodingError::NotFound {
                query: address.to_owned(),
            })
    }

    fn reverse(
        &self,
        location: Coord<f64>,
        deadline: &Deadline,
    ) -> Result<String, GeocodingError> {
        deadline.check()?;
        self.places
            .iter()
            .find(|(at, _)| *at == location)
            .map(|(_, name)| name.clone())
            .ok_or_else(|| GeocodingError::NotFound {
                query: format!("{},{}", location.y, location.x),
            })
    }
}

/// Failures raised by [`MemoryStore`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    /// A previous user panicked while holding the store.
    #[error("memory store lock poisoned")]
    Poisoned,
    /// The store was configured to reject trip saves.
    #[error("trip save rejected")]
    Rejected,
    /// The store was configured to reject hours saves.
    #[error("hours save rejected")]
    HoursRejected,
}

#[derive(Debug, Default)]
struct MemoryState {
    hours: HashMap<(String, NaiveDate), HoursOfServiceState>,
    trips: Vec<TripSummary>,
}

/// Thread-safe in-memory store implementing both persistence traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    reject_trips: bool,
    reject_hours: bool,
}

impl MemoryStore {
    /// Seed the store with an existing hours record.
    #[must_use]
    pub fn with_hours(self, hours: HoursOfServiceState) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state
                .hours
                .insert((hours.driver.clone(), hours.date), hours);
        }
        self
    }

    /// Make every trip save fail.
    #[must_use]
    pub fn rejecting_trips(mut self) -> Self {
        self.reject_trips = true;
        self
    }

    /// Make every hours save fail, including the one paired with a trip.
    #[must_use]
    pub fn rejecting_hours(mut self) -> Self {
        self.reject_hours = true;
        self
    }

    /// Stored hours for `driver` on `date`, without creating a record.
    #[must_use]
    pub fn hours(&self, driver: &str, date: NaiveDate) -> Option<HoursOfServiceState> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.hours.get(&(driver.to_owned(), date)).cloned())
    }

    /// Number of stored trips across all drivers.
    #[must_use]
    pub fn trip_count(&self) -> usize {
        self.state.lock().map_or(0, |state| state.trips.len())
    }
}

impl HoursOfServiceStore for MemoryStore {
    type Error = MemoryStoreError;

    fn load_hours(
        &self,
        driver: &str,
        date: NaiveDate,
    ) -> Result<HoursOfServiceState, Self::Error> {
        let mut state = self.state.lock().map_err(|_| MemoryStoreError::Poisoned)?;
        Ok(state
            .hours
            .entry((driver.to_owned(), date))
            .or_insert_with(|| HoursOfServiceState::new(driver, date))
            .clone())
    }

    fn save_hours(&self, hours: &HoursOfServiceState) -> Result<(), Self::Error> {
        if self.reject_hours {
            return Err(MemoryStoreError::HoursRejected);
        }
        let mut state = self.state.lock().map_err(|_| MemoryStoreError::Poisoned)?;
        state.record_hours(hours);
        Ok(())
    }
}

impl MemoryState {
    fn record_hours(&mut self, hours: &HoursOfServiceState) {
        self.hours
            .insert((hours.driver.clone(), hours.date), hours.clone());
    }

    fn record_trip(&mut self, driver: &str, request: &PlanRequest, plan: &TripPlan) -> TripId {
        let id = TripId::try_from(self.trips.len()).map_or(TripId::MAX, |len| len + 1);
        self.trips.push(TripSummary {
            id,
            driver: driver.to_owned(),
            request: request.clone(),
            total_distance: plan.total_distance,
            total_driving_hours: plan.total_driving_hours,
            total_trip_hours: plan.total_trip_hours,
            required_stop_count: plan.required_stop_count,
            created_at: plan
                .stops
                .first()
                .map_or_else(NaiveDateTime::default, |stop| stop.arrived_at),
        });
        id
    }
}

impl TripPlanStore for MemoryStore {
    type Error = MemoryStoreError;

    fn save_trip_plan(
        &self,
        driver: &str,
        request: &PlanRequest,
        plan: &TripPlan,
    ) -> Result<TripId, Self::Error> {
        if self.reject_trips {
            return Err(MemoryStoreError::Rejected);
        }
        let mut state = self.state.lock().map_err(|_| MemoryStoreError::Poisoned)?;
        Ok(state.record_trip(driver, request, plan))
    }

    fn save_trip_with_hours(
        &self,
        driver: &str,
        request: &PlanRequest,
        plan: &TripPlan,
        hours: &HoursOfServiceState,
    ) -> Result<TripId, Self::Error> {
        if self.reject_trips {
            return Err(MemoryStoreError::Rejected);
        }
        if self.reject_hours {
            return Err(MemoryStoreError::HoursRejected);
        }
        let mut state = self.state.lock().map_err(|_| MemoryStoreError::Poisoned)?;
        let id = state.record_trip(driver, request, plan);
        state.record_hours(hours);
        Ok(id)
    }

    fn recent_trips(&self, driver: &str, limit: usize) -> Result<Vec<TripSummary>, Self::Error> {
        let state = self.state.lock().map_err(|_| MemoryStoreError::Poisoned)?;
        Ok(state
            .trips
            .iter()
            .rev()
            .filter(|trip| trip.driver == driver)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Three named places with coordinates, wired into matching fakes.
#[derive(Debug, Clone, PartialEq)]
pub struct TripScenario {
    /// Addresses as the caller supplies them.
    pub request: PlanRequest,
    /// Coordinate of the current location.
    pub current: Coord<f64>,
    /// Coordinate of the pickup.
    pub pickup: Coord<f64>,
    /// Coordinate of the dropoff.
    pub dropoff: Coord<f64>,
}

impl Default for TripScenario {
    fn default() -> Self {
        Self {
            request: PlanRequest::new("Chicago, IL", "Gary, IN", "Nashville, TN"),
            current: Coord { x: -87.63, y: 41.88 },
            pickup: Coord { x: -87.35, y: 41.60 },
            dropoff: Coord { x: -86.78, y: 36.16 },
        }
    }
}

impl TripScenario {
    /// Legs of the given `(miles, hours)` between the scenario's places.
    #[must_use]
    pub fn legs(&self, to_pickup: (f64, f64), to_dropoff: (f64, f64)) -> TripLegs {
        TripLegs {
            to_pickup: RouteLeg::new(self.current, self.pickup, to_pickup.0, to_pickup.1),
            to_dropoff: RouteLeg::new(self.pickup, self.dropoff, to_dropoff.0, to_dropoff.1),
        }
    }

    /// Geocoder resolving the scenario's three addresses.
    #[must_use]
    pub fn geocoder(&self) -> FixedGeocoder {
        FixedGeocoder::new()
            .with_address(self.request.current_location.clone(), self.current)
            .with_address(self.request.pickup_location.clone(), self.pickup)
            .with_address(self.request.dropoff_location.clone(), self.dropoff)
    }

    /// Router serving `legs`.
    #[must_use]
    pub fn routing(&self, legs: &TripLegs) -> FixedRoutingProvider {
        FixedRoutingProvider::new(vec![legs.to_pickup.clone(), legs.to_dropoff.clone()])
    }
}

/// A short three-stop plan for persistence tests.
#[must_use]
pub fn sample_plan() -> TripPlan {
    let start = FixedClock::at(2024, 3, 1, 8, 0).0;
    let stop = |stop_type, location: &str, at: f64, hours: f64, duty_status| {
        let arrived_at = TimeFormatter::advance(start, at);
        let departed_at = TimeFormatter::advance(arrived_at, hours);
        Stop {
            stop_type,
            location: location.to_owned(),
            arrival_time: TimeFormatter::label(arrived_at),
            departure_time: TimeFormatter::label(departed_at),
            duration_hours: hours,
            duty_status,
            arrived_at,
            departed_at,
        }
    };
    TripPlan {
        total_distance: 170.0,
        total_driving_hours: 3.0,
        total_trip_hours: 5.0,
        elapsed_hours: 5.0,
        usage: HoursDelta {
            cycle_hours: 5.0,
            daily_used: 5.0,
            driving_used: 3.0,
        },
        stops: vec![
            stop(StopType::Start, "Depot", 0.0, 0.0, DutyStatus::OffDuty),
            stop(StopType::Pickup, "Mill", 1.0, 1.0, DutyStatus::OnDuty),
            stop(StopType::Dropoff, "Store", 4.0, 1.0, DutyStatus::OnDuty),
        ],
        required_stop_count: 1,
    }
}
