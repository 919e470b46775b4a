//! HOS-compliant trip segmentation.
//!
//! [`SegmentationEngine`] simulates the drive from the current location to
//! the pickup and on to the dropoff, inserting REST, OVERNIGHT and FUEL stops
//! so the driver never runs past the break, driving, duty or fuel thresholds
//! in [`limits`].
//!
//! Each iteration of the leg loop does one of three things:
//!
//! 1. Takes a ten-hour reset when the window's driving allowance is spent or
//!    the next increment plus a half-hour margin would reach the duty limit.
//!    An exhausted break allowance yields a zero increment, so a reset
//!    preempts a break that is due at the same time.
//! 2. Takes a break when eight hours have been driven since the last one.
//! 3. Drives the increment, interpolating distance at the average speed of
//!    what remains of the leg, then refuels for each 1000-mile boundary
//!    crossed.
//!
//! Every ON_DUTY stop counts against the duty window. PICKUP, DROPOFF and
//! FUEL stops that would overrun it are preceded by a reset at the same
//! place.

mod context;
pub mod limits;

use chrono::NaiveDateTime;
use log::{debug, warn};

use crate::plan::round_tenths;
use crate::{
    Deadline, DutyStatus, HoursOfServiceState, Interrupted, PlanRequest, RouteLeg, StopLocator,
    StopType, TimeFormatter, TripPlan,
};

use context::{LegProgress, SimulationContext};
use limits::{
    BREAK_AFTER, DROPOFF_DURATION, FUEL_DURATION, MAX_DRIVING, MAX_DUTY, OVERNIGHT_MARGIN,
    PICKUP_DURATION,
};

/// The two routed legs of a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct TripLegs {
    /// Current location to pickup.
    pub to_pickup: RouteLeg,
    /// Pickup to dropoff.
    pub to_dropoff: RouteLeg,
}

/// Runs the constrained simulation for one trip.
///
/// The engine borrows the driver's usage snapshot and never mutates it; the
/// caller applies [`TripPlan::hours_delta`] once the plan is accepted.
#[derive(Debug, Clone, Copy)]
pub struct SegmentationEngine<'a> {
    locator: StopLocator<'a>,
}

impl<'a> SegmentationEngine<'a> {
    /// Build an engine labelling stops through `locator`.
    #[must_use]
    pub const fn new(locator: StopLocator<'a>) -> Self {
        Self { locator }
    }

    /// Produce the stop sequence for `legs`, starting the clock at `start`.
    ///
    /// START, PICKUP and DROPOFF use the addresses in `request` verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] if `deadline` fires during a stop-label lookup.
    pub fn segment(
        &self,
        request: &PlanRequest,
        legs: &TripLegs,
        hours: &HoursOfServiceState,
        start: NaiveDateTime,
        deadline: &Deadline,
    ) -> Result<TripPlan, Interrupted> {
        let mut ctx = SimulationContext::new(start, hours);
        ctx.stop(
            StopType::Start,
            request.current_location.clone(),
            0.0,
            DutyStatus::OffDuty,
        );

        self.drive_leg(&mut ctx, &legs.to_pickup, deadline)?;
        reset_unless_fits(&mut ctx, PICKUP_DURATION, &request.pickup_location);
        ctx.stop(
            StopType::Pickup,
            request.pickup_location.clone(),
            PICKUP_DURATION,
            DutyStatus::OnDuty,
        );

        self.drive_leg(&mut ctx, &legs.to_dropoff, deadline)?;
        reset_unless_fits(&mut ctx, DROPOFF_DURATION, &request.dropoff_location);
        ctx.stop(
            StopType::Dropoff,
            request.dropoff_location.clone(),
            DROPOFF_DURATION,
            DutyStatus::OnDuty,
        );

        Ok(finish(ctx, legs))
    }

    fn drive_leg(
        &self,
        ctx: &mut SimulationContext,
        leg: &RouteLeg,
        deadline: &Deadline,
    ) -> Result<(), Interrupted> {
        let mut progress = LegProgress::start(leg);
        while progress.remaining_distance > 0.0 {
            let increment = (BREAK_AFTER - ctx.driving_used)
                .min(MAX_DRIVING - ctx.window_driving)
                .max(0.0)
                .min(progress.remaining_duration)
                .min(MAX_DUTY - ctx.duty_used);

            if ctx.window_driving >= MAX_DRIVING
                || ctx.duty_used + increment + OVERNIGHT_MARGIN >= MAX_DUTY
            {
                let location = self.label(&progress, StopType::Overnight, deadline)?;
                ctx.reset(location);
                continue;
            }

            if ctx.driving_used >= BREAK_AFTER {
                let location = self.label(&progress, StopType::Rest, deadline)?;
                ctx.take_break(location);
                continue;
            }

            if progress.remaining_duration <= 0.0 {
                warn!(
                    "leg has {} miles left but no duration; finishing it in place",
                    progress.remaining_distance
                );
                let miles = progress.remaining_distance;
                let crossed = ctx.drive(0.0, miles);
                progress.advance(0.0, miles);
                self.refuel(ctx, &progress, crossed, deadline)?;
                continue;
            }

            let miles = progress.miles_for(increment);
            let crossed = ctx.drive(increment, miles);
            progress.advance(increment, miles);
            self.refuel(ctx, &progress, crossed, deadline)?;
        }
        Ok(())
    }

    fn refuel(
        &self,
        ctx: &mut SimulationContext,
        progress: &LegProgress<'_>,
        crossed: u32,
        deadline: &Deadline,
    ) -> Result<(), Interrupted> {
        for _ in 0..crossed {
            let location = self.label(progress, StopType::Fuel, deadline)?;
            reset_unless_fits(ctx, FUEL_DURATION, &location);
            ctx.refuel(location);
        }
        Ok(())
    }

    fn label(
        &self,
        progress: &LegProgress<'_>,
        kind: StopType,
        deadline: &Deadline,
    ) -> Result<String, Interrupted> {
        self.locator
            .locate(progress.leg, progress.completion(), kind, deadline)
    }
}

/// Take a reset at `location` when `hours` more duty would overrun the window.
fn reset_unless_fits(ctx: &mut SimulationContext, hours: f64, location: &str) {
    if ctx.duty_used + hours > MAX_DUTY {
        debug!("duty window exhausted at {location:?}; resetting first");
        ctx.reset(location.to_owned());
    }
}

fn finish(ctx: SimulationContext, legs: &TripLegs) -> TripPlan {
    let total_trip_hours = match (ctx.stops().first(), ctx.stops().last()) {
        (Some(first), Some(last)) => {
            TimeFormatter::label_span_hours(first.arrived_at, last.departed_at)
        }
        _ => 0.0,
    };
    let elapsed_hours = ctx.elapsed_hours;
    let usage = ctx.usage();
    let stops = ctx.into_stops();
    TripPlan {
        total_distance: round_tenths(legs.to_pickup.distance_miles + legs.to_dropoff.distance_miles),
        total_driving_hours: round_tenths(
            legs.to_pickup.duration_hours + legs.to_dropoff.duration_hours,
        ),
        total_trip_hours: round_tenths(total_trip_hours),
        elapsed_hours,
        usage,
        required_stop_count: stops.len().saturating_sub(2),
        stops,
    }
}
