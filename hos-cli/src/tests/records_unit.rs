//! Unit tests for the `hours` and `trips` commands.

use super::helpers::{Workspace, decode};
use super::*;
use crate::records::{HoursConfig, TripsConfig, open_store, run_hours_with, run_trips_with};
use chrono::NaiveDate;
use hos_core::test_support::{FixedClock, sample_plan};
use hos_core::{HoursOfServiceState, HoursOfServiceStore, PlanRequest, TripPlanStore, TripSummary};
use rstest::{fixture, rstest};
use serde_json::Value;

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

fn hours_args(workspace: &Workspace, date: Option<NaiveDate>) -> HoursArgs {
    HoursArgs {
        database: Some(workspace.database().clone()),
        driver: Some("driver-1".to_owned()),
        date,
    }
}

#[rstest]
fn hours_config_requires_a_driver() {
    let err = HoursConfig::try_from(HoursArgs::default()).expect_err("missing driver");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_DRIVER);
            assert_eq!(env, ENV_HOURS_DRIVER);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn trips_config_defaults_database_and_limit() {
    let config = TripsConfig::try_from(TripsArgs {
        driver: Some("driver-1".to_owned()),
        ..TripsArgs::default()
    })
    .expect("config should build");

    assert_eq!(config.database.as_str(), "hos.db");
    assert_eq!(config.limit, 5);
}

#[rstest]
fn hours_for_a_new_driver_are_zero(workspace: Workspace) {
    let mut output = Vec::new();

    run_hours_with(
        hours_args(&workspace, None),
        &FixedClock::at(2024, 3, 1, 9, 0),
        &mut output,
    )
    .expect("hours command should succeed");

    let report: Value = decode(&output);
    assert_eq!(report["driver"], "driver-1");
    assert_eq!(report["date"], "2024-03-01");
    assert_eq!(report["daily_used"], 0.0);
    assert_eq!(report["over_daily_limit"], false);
}

#[rstest]
fn hours_report_flags_an_exhausted_cycle(workspace: Workspace) {
    let store = open_store(workspace.database()).expect("open store");
    store
        .save_hours(&HoursOfServiceState::new("driver-1", day()).with_usage(71.0, 15.0, 11.0))
        .expect("seed hours");
    drop(store);
    let mut output = Vec::new();

    run_hours_with(
        hours_args(&workspace, Some(day())),
        &FixedClock::at(2030, 1, 1, 0, 0),
        &mut output,
    )
    .expect("hours command should succeed");

    let report: Value = decode(&output);
    assert_eq!(report["cycle_used"], 71.0);
    assert_eq!(report["over_daily_limit"], true);
    assert_eq!(report["over_cycle_limit"], true);
}

#[rstest]
fn trips_lists_newest_first_within_the_limit(workspace: Workspace) {
    let store = open_store(workspace.database()).expect("open store");
    let request = PlanRequest::new("Chicago, IL", "Gary, IN", "Nashville, TN");
    let ids: Vec<_> = (0..3)
        .map(|_| {
            store
                .save_trip_plan("driver-1", &request, &sample_plan())
                .expect("save trip")
        })
        .collect();
    drop(store);
    let mut output = Vec::new();

    run_trips_with(
        TripsArgs {
            database: Some(workspace.database().clone()),
            driver: Some("driver-1".to_owned()),
            limit: Some(2),
        },
        &mut output,
    )
    .expect("trips command should succeed");

    let trips: Vec<TripSummary> = decode(&output);
    let listed: Vec<_> = trips.iter().map(|trip| trip.id).collect();
    assert_eq!(listed, vec![ids[2], ids[1]]);
    assert_eq!(trips[0].request, request);
}

#[rstest]
fn store_in_an_unusable_location_reports_the_path(workspace: Workspace) {
    let blocker = workspace.database().parent().expect("parent").to_owned();
    std::fs::create_dir_all(blocker.parent().expect("root")).expect("create root");
    std::fs::write(&blocker, b"not a directory").expect("write blocker");

    let err = open_store(workspace.database()).expect_err("parent is a file");
    match err {
        CliError::OpenStore { path, .. } => assert_eq!(&path, workspace.database()),
        other => panic!("expected OpenStore, found {other:?}"),
    }
}
