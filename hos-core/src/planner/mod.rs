//! Resolve addresses, fetch legs and run the engine.
//!
//! [`RoutePlanner`] is the stateless half of planning: it validates the
//! request, geocodes the three addresses, fetches the two legs one after the
//! other and segments them. [`TripPlanner`] wraps it with persistence and
//! per-driver serialization.

mod locks;
mod service;

use chrono::NaiveDateTime;
use geo::Coord;
use log::debug;

use crate::geocoding::{GeocodingError, GeocodingProvider};
use crate::routing::{RoutingError, RoutingProvider};
use crate::{
    Clock, Deadline, HoursOfServiceState, PlanError, PlanRequest, PlanRequestValidationError,
    RouteLeg, SegmentationEngine, StopLocator, TripLegs, TripPlan,
};

pub use locks::DriverLocks;
pub use service::{PlannedTrip, TripPlanner, TripService};

/// Plans a single trip against injected collaborators.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use hos_core::test_support::{FixedClock, FixedGeocoder, FixedRoutingProvider};
/// use hos_core::{Deadline, HoursOfServiceState, PlanRequest, RouteLeg, RoutePlanner};
///
/// let depot = Coord { x: -87.6, y: 41.9 };
/// let mill = Coord { x: -87.0, y: 41.6 };
/// let store = Coord { x: -86.2, y: 39.8 };
/// let geocoder = FixedGeocoder::new()
///     .with_address("Depot", depot)
///     .with_address("Mill", mill)
///     .with_address("Store", store);
/// let routing = FixedRoutingProvider::new(vec![
///     RouteLeg::new(depot, mill, 50.0, 1.0),
///     RouteLeg::new(mill, store, 120.0, 2.0),
/// ]);
/// let clock = FixedClock::at(2024, 3, 1, 8, 0);
/// let planner = RoutePlanner::new(routing, geocoder, clock);
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
/// let plan = planner.plan_route(
///     &PlanRequest::new("Depot", "Mill", "Store"),
///     &HoursOfServiceState::new("driver-1", date),
///     &Deadline::unbounded(),
/// )?;
/// assert_eq!(plan.total_distance, 170.0);
/// assert_eq!(plan.required_stop_count, 1);
/// # Ok::<(), hos_core::PlanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RoutePlanner<R, G, C> {
    routing: R,
    geocoder: G,
    clock: C,
}

impl<R, G, C> RoutePlanner<R, G, C>
where
    R: RoutingProvider,
    G: GeocodingProvider,
    C: Clock,
{
    /// Assemble a planner from its collaborators.
    pub const fn new(routing: R, geocoder: G, clock: C) -> Self {
        Self {
            routing,
            geocoder,
            clock,
        }
    }

    /// Clock used to start the simulation.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Plan a trip starting now.
    ///
    /// # Errors
    ///
    /// See [`RoutePlanner::plan_route_at`].
    pub fn plan_route(
        &self,
        request: &PlanRequest,
        hours: &HoursOfServiceState,
        deadline: &Deadline,
    ) -> Result<TripPlan, PlanError> {
        self.plan_route_at(request, hours, self.clock.now(), deadline)
    }

    /// Plan a trip whose simulation clock starts at `start`.
    ///
    /// `hours` is only read; applying the resulting delta is the caller's job.
    ///
    /// # Errors
    ///
    /// - [`PlanError::Validation`] before any collaborator is called.
    /// - [`PlanError::InvalidLocation`] when an address cannot be resolved.
    /// - [`PlanError::RoutingUnavailable`] when either leg cannot be fetched.
    /// - [`PlanError::DeadlineExceeded`] or [`PlanError::Cancelled`] when
    ///   `deadline` fires.
    pub fn plan_route_at(
        &self,
        request: &PlanRequest,
        hours: &HoursOfServiceState,
        start: NaiveDateTime,
        deadline: &Deadline,
    ) -> Result<TripPlan, PlanError> {
        request.validate()?;
        if let Some(field) = hours.invalid_field() {
            return Err(PlanRequestValidationError::InvalidHours { field }.into());
        }

        let current = self.resolve(&request.current_location, deadline)?;
        let pickup = self.resolve(&request.pickup_location, deadline)?;
        let dropoff = self.resolve(&request.dropoff_location, deadline)?;

        let legs = TripLegs {
            to_pickup: self.leg(
                (&request.current_location, current),
                (&request.pickup_location, pickup),
                deadline,
            )?,
            to_dropoff: self.leg(
                (&request.pickup_location, pickup),
                (&request.dropoff_location, dropoff),
                deadline,
            )?,
        };

        let engine = SegmentationEngine::new(StopLocator::with_reverse(&self.geocoder));
        Ok(engine.segment(request, &legs, hours, start, deadline)?)
    }

    fn resolve(&self, address: &str, deadline: &Deadline) -> Result<Coord<f64>, PlanError> {
        deadline.check()?;
        debug!("geocoding {address:?}");
        self.geocoder
            .forward(address, deadline)
            .map_err(|err| match err {
                GeocodingError::Interrupted(reason) => reason.into(),
                other => PlanError::InvalidLocation {
                    location: address.to_owned(),
                    reason: other.to_string(),
                },
            })
    }

    fn leg(
        &self,
        (from, origin): (&str, Coord<f64>),
        (to, destination): (&str, Coord<f64>),
        deadline: &Deadline,
    ) -> Result<RouteLeg, PlanError> {
        deadline.check()?;
        debug!("routing {from:?} -> {to:?}");
        self.routing
            .route_between(origin, destination, deadline)
            .map_err(|err| match err {
                RoutingError::Interrupted(reason) => reason.into(),
                source => PlanError::RoutingUnavailable {
                    from: from.to_owned(),
                    to: to.to_owned(),
                    source,
                },
            })
    }
}

#[cfg(test)]
mod tests;
