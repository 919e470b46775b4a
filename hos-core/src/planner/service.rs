//! Serialized load, plan, persist and apply cycle.

use log::info;

use crate::geocoding::GeocodingProvider;
use crate::routing::RoutingProvider;
use crate::{
    Clock, Deadline, DriverLocks, HoursOfServiceState, HoursOfServiceStore, PlanError,
    PlanRequest, RoutePlanner, TripId, TripPlan, TripPlanStore,
};

/// An accepted, persisted plan and the driver's updated usage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannedTrip {
    /// Identifier the store assigned to the trip.
    pub trip_id: TripId,
    /// The plan as persisted.
    pub plan: TripPlan,
    /// Usage after the plan's delta was applied, as stored with the trip.
    pub hours: HoursOfServiceState,
}

/// Plan and record trips for drivers.
///
/// Implementations must be `Send + Sync`; concurrent calls for the same
/// driver are serialized.
pub trait TripService: Send + Sync {
    /// Plan a trip for `driver`, persist it and update their hours.
    ///
    /// # Errors
    ///
    /// Any [`PlanError`]. On error nothing has been applied to the driver's
    /// hours.
    fn plan_trip(
        &self,
        driver: &str,
        request: &PlanRequest,
        deadline: &Deadline,
    ) -> Result<PlannedTrip, PlanError>;
}

/// [`RoutePlanner`] plus persistence and a per-driver lock.
#[derive(Debug)]
pub struct TripPlanner<R, G, C, S> {
    routes: RoutePlanner<R, G, C>,
    store: S,
    locks: DriverLocks,
}

impl<R, G, C, S> TripPlanner<R, G, C, S>
where
    R: RoutingProvider,
    G: GeocodingProvider,
    C: Clock,
    S: HoursOfServiceStore + TripPlanStore,
{
    /// Wrap `routes` with `store`.
    pub fn new(routes: RoutePlanner<R, G, C>, store: S) -> Self {
        Self {
            routes,
            store,
            locks: DriverLocks::new(),
        }
    }

    /// Backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Give back the store, e.g. to close its connection.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Run one planning cycle while holding `driver`'s lock.
    ///
    /// The trip and the driver's updated hours are stored in one write; if
    /// it fails, neither is recorded.
    ///
    /// # Errors
    ///
    /// See [`TripService::plan_trip`].
    pub fn plan_for_driver(
        &self,
        driver: &str,
        request: &PlanRequest,
        deadline: &Deadline,
    ) -> Result<PlannedTrip, PlanError> {
        request.validate()?;
        let lock = self.locks.lock_for(driver)?;
        let _guard = lock.lock().map_err(|_| PlanError::LockPoisoned {
            driver: driver.to_owned(),
        })?;
        deadline.check()?;

        let now = self.routes.clock().now();
        let mut hours = HoursOfServiceStore::load_hours(&self.store, driver, now.date())
            .map_err(PlanError::persistence("load hours of service"))?;
        let plan = self.routes.plan_route_at(request, &hours, now, deadline)?;
        deadline.check()?;

        hours.apply(plan.hours_delta());
        let trip_id = self
            .store
            .save_trip_with_hours(driver, request, &plan, &hours)
            .map_err(PlanError::persistence("save trip and hours"))?;

        info!(
            "trip {trip_id} accepted for {driver}: {} mi, {} stops; daily {:.1}h, cycle {:.1}h",
            plan.total_distance, plan.required_stop_count, hours.daily_used, hours.cycle_used
        );
        Ok(PlannedTrip {
            trip_id,
            plan,
            hours,
        })
    }
}

impl<R, G, C, S> TripService for TripPlanner<R, G, C, S>
where
    R: RoutingProvider + Send + Sync,
    G: GeocodingProvider + Send + Sync,
    C: Clock + Send + Sync,
    S: HoursOfServiceStore + TripPlanStore + Send + Sync,
{
    fn plan_trip(
        &self,
        driver: &str,
        request: &PlanRequest,
        deadline: &Deadline,
    ) -> Result<PlannedTrip, PlanError> {
        self.plan_for_driver(driver, request, deadline)
    }
}
