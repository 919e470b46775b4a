//! Behaviour-driven step definitions driving the plan CLI scenarios.

use super::helpers::{Workspace, decode, parse};
use super::*;
use crate::plan::{PlanConfig, TripServiceBuilder, run_plan_with};
use crate::records::{open_store, run_hours_with, run_trips_with};
use hos_core::test_support::{FixedClock, FixedRoutingProvider, TripScenario};
use hos_core::{
    PlanError, PlanRequestValidationError, PlannedTrip, RoutePlanner, StopType, TripPlanner,
    TripService, TripSummary,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use std::cell::RefCell;

fn clock() -> FixedClock {
    FixedClock::at(2024, 3, 1, 8, 0)
}

/// Serves the Chicago, Gary and Nashville scenario against the real store.
struct ScenarioServiceBuilder {
    second_leg_routable: bool,
}

impl TripServiceBuilder for ScenarioServiceBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn TripService>, CliError> {
        let places = TripScenario::default();
        let legs = places.legs((50.0, 1.0), (600.0, 9.0));
        let mut served = vec![legs.to_pickup];
        if self.second_leg_routable {
            served.push(legs.to_dropoff);
        }
        let store = open_store(&config.database)?.with_clock(clock());
        let routing = FixedRoutingProvider::new(served);
        let routes = RoutePlanner::new(routing, places.geocoder(), clock());
        Ok(Box::new(TripPlanner::new(routes, store)))
    }
}

struct PlanWorld {
    workspace: Workspace,
    places: TripScenario,
    pickup: RefCell<String>,
    second_leg_routable: RefCell<bool>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl PlanWorld {
    fn plan(&self, driver: Option<&str>) {
        let request = &self.places.request;
        let pickup = self.pickup.borrow();
        let database = self.workspace.database().as_str();
        let mut argv = vec![
            "hos",
            "plan",
            "--database",
            database,
            "--current-location",
            request.current_location.as_str(),
            "--pickup-location",
            pickup.as_str(),
            "--dropoff-location",
            request.dropoff_location.as_str(),
        ];
        if let Some(id) = driver {
            argv.extend(["--driver", id]);
        }

        let builder = ScenarioServiceBuilder {
            second_leg_routable: *self.second_leg_routable.borrow(),
        };
        let outcome = parse(&argv).and_then(|command| match command {
            Command::Plan(args) => {
                let mut buffer = self.stdout.borrow_mut();
                run_plan_with(args, &builder, &mut *buffer)
            }
            other => panic!("expected plan command, found {other:?}"),
        });
        self.result.replace(Some(outcome));
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }

    fn trips(&self, driver: &str) -> Vec<TripSummary> {
        let mut output = Vec::new();
        run_trips_with(
            TripsArgs {
                database: Some(self.workspace.database().clone()),
                driver: Some(driver.to_owned()),
                limit: None,
            },
            &mut output,
        )
        .expect("trips command should succeed");
        decode(&output)
    }
}

#[fixture]
fn world() -> PlanWorld {
    let places = TripScenario::default();
    PlanWorld {
        workspace: Workspace::new(),
        pickup: RefCell::new(places.request.pickup_location.clone()),
        places,
        second_leg_routable: RefCell::new(true),
        stdout: RefCell::new(Vec::new()),
        result: RefCell::new(None),
    }
}

#[given("an empty trip database")]
fn empty_database(#[from(world)] world: &PlanWorld) {
    assert!(!world.workspace.database().exists());
}

#[given("the pickup address is blank")]
fn blank_pickup(#[from(world)] world: &PlanWorld) {
    *world.pickup.borrow_mut() = "   ".to_owned();
}

#[given("the second leg cannot be routed")]
fn second_leg_unroutable(#[from(world)] world: &PlanWorld) {
    *world.second_leg_routable.borrow_mut() = false;
}

#[when("I plan the Chicago to Nashville trip for {driver}")]
fn plan_for_driver(#[from(world)] world: &PlanWorld, driver: String) {
    world.plan(Some(driver.as_str()));
}

#[when("I plan the Chicago to Nashville trip without a driver")]
fn plan_without_driver(#[from(world)] world: &PlanWorld) {
    world.plan(None);
}

#[then("the command succeeds and prints a {miles} mile plan")]
fn prints_plan(#[from(world)] world: &PlanWorld, miles: f64) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    result.as_ref().expect("expected success");

    let planned: PlannedTrip = decode(&world.stdout.borrow());
    assert_eq!(planned.trip_id, 1);
    assert!((planned.plan.total_distance - miles).abs() < 1e-9);
    let kinds: Vec<_> = planned.plan.stops.iter().map(|stop| stop.stop_type).collect();
    assert_eq!(kinds.first(), Some(&StopType::Start));
    assert_eq!(kinds.last(), Some(&StopType::Dropoff));
}

#[then("the trips command lists {count} trip for {driver}")]
fn lists_one_trip(#[from(world)] world: &PlanWorld, count: usize, driver: String) {
    assert_eq!(world.trips(&driver).len(), count);
}

#[then("the trips command lists {count} trips for {driver}")]
fn lists_trips(#[from(world)] world: &PlanWorld, count: usize, driver: String) {
    assert_eq!(world.trips(&driver).len(), count);
}

#[then("the hours command reports {hours} daily hours for {driver}")]
fn reports_hours(#[from(world)] world: &PlanWorld, hours: f64, driver: String) {
    let mut output = Vec::new();
    run_hours_with(
        HoursArgs {
            database: Some(world.workspace.database().clone()),
            driver: Some(driver),
            date: None,
        },
        &clock(),
        &mut output,
    )
    .expect("hours command should succeed");

    let report: Value = decode(&output);
    let daily = report["daily_used"].as_f64().expect("daily usage");
    assert!((daily - hours).abs() < 1e-9, "expected {hours}h, got {daily}h");
}

#[then("the command fails because the pickup address is blank")]
fn fails_blank_pickup(#[from(world)] world: &PlanWorld) {
    match &*world.error() {
        CliError::Plan(PlanError::Validation(PlanRequestValidationError::Blank { field })) => {
            assert_eq!(*field, "pickup_location");
        }
        other => panic!("expected a blank pickup validation error, found {other:?}"),
    }
}

#[then("the command fails because the driver is missing")]
fn fails_missing_driver(#[from(world)] world: &PlanWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, env } => {
            assert_eq!(*field, ARG_DRIVER);
            assert_eq!(*env, ENV_PLAN_DRIVER);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[then("the command fails because routing is unavailable")]
fn fails_unroutable(#[from(world)] world: &PlanWorld) {
    match &*world.error() {
        CliError::Plan(PlanError::RoutingUnavailable { .. }) => {}
        other => panic!("expected RoutingUnavailable, found {other:?}"),
    }
    assert!(world.stdout.borrow().is_empty());
}

macro_rules! register_plan_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/plan_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: PlanWorld) {
            let _ = world;
        }
    };
}

register_plan_scenario!(plan_happy_path, "planning a trip and reading it back");
register_plan_scenario!(plan_blank_pickup, "rejecting a blank pickup address");
register_plan_scenario!(plan_missing_driver, "rejecting a plan without a driver");
register_plan_scenario!(plan_unroutable_leg, "an unroutable leg stores nothing");
