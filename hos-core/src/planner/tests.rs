use super::*;
use chrono::NaiveDate;
use rstest::{fixture, rstest};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::test_support::{
    FixedClock, FixedGeocoder, FixedRoutingProvider, MemoryStore, TripScenario,
};
use crate::{HoursOfServiceStore, StopType, TripPlanStore};

type Planner = RoutePlanner<FixedRoutingProvider, FixedGeocoder, FixedClock>;

#[fixture]
fn scenario() -> TripScenario {
    TripScenario::default()
}

#[fixture]
fn planner(scenario: TripScenario) -> Planner {
    let legs = scenario.legs((50.0, 1.0), (600.0, 9.0));
    RoutePlanner::new(
        scenario.routing(&legs),
        scenario.geocoder(),
        FixedClock::at(2024, 3, 1, 8, 0),
    )
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

fn zeroed() -> HoursOfServiceState {
    HoursOfServiceState::new("driver-1", day())
}

#[rstest]
fn plans_route_through_collaborators(planner: Planner, scenario: TripScenario) {
    let plan = planner
        .plan_route(&scenario.request, &zeroed(), &Deadline::unbounded())
        .expect("planning succeeds");
    assert_eq!(plan.count_of(StopType::Rest), 1);
    assert_eq!(plan.stops[0].arrival_time, "08:00 AM");
}

#[rstest]
fn blank_address_fails_validation_before_lookup(planner: Planner) {
    let request = PlanRequest::new("Chicago, IL", "   ", "Nashville, TN");
    let err = planner
        .plan_route(&request, &zeroed(), &Deadline::unbounded())
        .expect_err("blank pickup");
    assert!(matches!(
        err,
        PlanError::Validation(PlanRequestValidationError::Blank {
            field: "pickup_location"
        })
    ));
}

#[rstest]
fn negative_usage_fails_validation(planner: Planner, scenario: TripScenario) {
    let hours = zeroed().with_usage(0.0, -2.0, 0.0);
    let err = planner
        .plan_route(&scenario.request, &hours, &Deadline::unbounded())
        .expect_err("negative daily usage");
    assert!(matches!(
        err,
        PlanError::Validation(PlanRequestValidationError::InvalidHours {
            field: "daily_used"
        })
    ));
}

#[rstest]
fn unknown_address_is_an_invalid_location(planner: Planner, scenario: TripScenario) {
    let mut request = scenario.request;
    request.dropoff_location = "Atlantis".to_owned();
    let err = planner
        .plan_route(&request, &zeroed(), &Deadline::unbounded())
        .expect_err("unknown dropoff");
    assert!(matches!(
        err,
        PlanError::InvalidLocation { ref location, .. } if location == "Atlantis"
    ));
}

#[rstest]
fn missing_leg_is_routing_unavailable(scenario: TripScenario) {
    let legs = scenario.legs((50.0, 1.0), (600.0, 9.0));
    let planner = RoutePlanner::new(
        FixedRoutingProvider::new(vec![legs.to_pickup]),
        scenario.geocoder(),
        FixedClock::at(2024, 3, 1, 8, 0),
    );
    let err = planner
        .plan_route(&scenario.request, &zeroed(), &Deadline::unbounded())
        .expect_err("second leg missing");
    match err {
        PlanError::RoutingUnavailable { from, to, source } => {
            assert_eq!(from, "Gary, IN");
            assert_eq!(to, "Nashville, TN");
            assert_eq!(source, RoutingError::NoRoute);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn expired_deadline_stops_before_any_lookup(planner: Planner, scenario: TripScenario) {
    let err = planner
        .plan_route(
            &scenario.request,
            &zeroed(),
            &Deadline::after(Duration::ZERO),
        )
        .expect_err("deadline already passed");
    assert!(matches!(err, PlanError::DeadlineExceeded));
}

#[rstest]
fn accepted_trip_is_stored_then_applied(planner: Planner, scenario: TripScenario) {
    let service = TripPlanner::new(planner, MemoryStore::default());
    let planned = service
        .plan_trip("driver-1", &scenario.request, &Deadline::unbounded())
        .expect("planning succeeds");

    assert_eq!(planned.hours.driving_used, 10.0);
    assert_eq!(planned.hours.daily_used, 12.5);
    assert_eq!(planned.hours.cycle_used, 12.5);
    assert_eq!(service.store().hours("driver-1", day()), Some(planned.hours.clone()));
    let trips = service
        .store()
        .recent_trips("driver-1", 5)
        .expect("list trips");
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].id, planned.trip_id);
}

#[rstest]
fn existing_usage_seeds_the_simulation(planner: Planner, scenario: TripScenario) {
    let store = MemoryStore::default().with_hours(zeroed().with_usage(10.0, 0.0, 10.0));
    let service = TripPlanner::new(planner, store);
    let planned = service
        .plan_trip("driver-1", &scenario.request, &Deadline::unbounded())
        .expect("planning succeeds");
    assert_eq!(planned.plan.stops[1].stop_type, StopType::Rest);
    assert_eq!(planned.plan.count_of(StopType::Overnight), 1);
    // The reset after the pickup restarts the window: 8 + 1 hours driven.
    assert_eq!(planned.hours.driving_used, 9.0);
    assert_eq!(planned.hours.daily_used, 10.5);
    assert!(!planned.hours.is_over_daily_limit());
}

#[rstest]
fn rejected_save_leaves_hours_untouched(planner: Planner, scenario: TripScenario) {
    let service = TripPlanner::new(planner, MemoryStore::default().rejecting_trips());
    let err = service
        .plan_trip("driver-1", &scenario.request, &Deadline::unbounded())
        .expect_err("store rejects trips");

    assert!(matches!(
        err,
        PlanError::Persistence {
            operation: "save trip and hours",
            ..
        }
    ));
    let hours = service
        .store()
        .load_hours("driver-1", day())
        .expect("load hours");
    assert_eq!(hours, zeroed());
    assert_eq!(service.store().trip_count(), 0);
}

#[rstest]
fn failed_hours_write_stores_no_trip(planner: Planner, scenario: TripScenario) {
    let service = TripPlanner::new(planner, MemoryStore::default().rejecting_hours());
    let err = service
        .plan_trip("driver-1", &scenario.request, &Deadline::unbounded())
        .expect_err("store rejects hours");

    assert!(matches!(err, PlanError::Persistence { .. }));
    assert_eq!(service.store().trip_count(), 0);
    assert_eq!(service.store().hours("driver-1", day()), Some(zeroed()));
}

#[rstest]
fn failed_plan_creates_no_trip(scenario: TripScenario) {
    let planner = RoutePlanner::new(
        FixedRoutingProvider::default(),
        scenario.geocoder(),
        FixedClock::at(2024, 3, 1, 8, 0),
    );
    let service = TripPlanner::new(planner, MemoryStore::default());
    let err = service
        .plan_trip("driver-1", &scenario.request, &Deadline::unbounded())
        .expect_err("no legs configured");

    assert!(matches!(err, PlanError::RoutingUnavailable { .. }));
    assert_eq!(service.store().trip_count(), 0);
    assert_eq!(service.store().hours("driver-1", day()), Some(zeroed()));
}

#[rstest]
fn concurrent_plans_for_one_driver_do_not_lose_updates(planner: Planner, scenario: TripScenario) {
    const CALLS: usize = 8;
    let planner = Arc::new(TripPlanner::new(planner, MemoryStore::default()));
    let service: Arc<dyn TripService> = planner.clone();
    let request = Arc::new(scenario.request);

    let handles: Vec<_> = (0..CALLS)
        .map(|_| {
            let service = Arc::clone(&service);
            let request = Arc::clone(&request);
            thread::spawn(move || {
                service
                    .plan_trip("driver-1", &request, &Deadline::unbounded())
                    .map(|planned| {
                        (planned.plan.hours_delta().cycle_hours, planned.hours.cycle_used)
                    })
            })
        })
        .collect();

    let mut outcomes: Vec<(f64, f64)> = handles
        .into_iter()
        .map(|handle| {
            handle
                .join()
                .expect("planning thread panicked")
                .expect("planning succeeds")
        })
        .collect();
    outcomes.sort_by(|a, b| a.1.total_cmp(&b.1));

    // Each call started from the hours the previous call saved.
    let mut running = 0.0;
    for (cycle_hours, cycle_used) in &outcomes {
        running += cycle_hours;
        assert!((cycle_used - running).abs() < 1e-9);
    }
    let stored = planner
        .store()
        .hours("driver-1", day())
        .expect("hours were saved");
    assert!((stored.cycle_used - running).abs() < 1e-9);
}
