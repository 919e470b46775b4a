//! Unit tests for the SQLite hours and trip store.

use super::{SCHEMA_VERSION, SqliteHosStore, SqliteStoreError, StoreSchemaError, initialise_schema};
use camino::Utf8PathBuf;
use chrono::NaiveDate;
use hos_core::test_support::{FixedClock, sample_plan};
use hos_core::{HoursOfServiceState, HoursOfServiceStore, PlanRequest, TripPlanStore};
use rstest::{fixture, rstest};
use rusqlite::Connection;
use tempfile::TempDir;

type Store = SqliteHosStore<FixedClock>;

#[fixture]
fn store() -> Store {
    SqliteHosStore::open_in_memory()
        .expect("open in-memory store")
        .with_clock(FixedClock::at(2024, 3, 1, 18, 30))
}

#[fixture]
fn request() -> PlanRequest {
    PlanRequest::new("Chicago, IL", "Gary, IN", "Nashville, TN")
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

fn count(connection: &Connection, sql: &str) -> i64 {
    connection
        .query_row(sql, [], |row| row.get(0))
        .expect("count rows")
}

#[rstest]
fn initialises_schema_records_version() -> Result<(), StoreSchemaError> {
    let mut connection = Connection::open_in_memory().expect("open in-memory database");

    initialise_schema(&mut connection)?;
    initialise_schema(&mut connection)?;

    let version: i64 = connection
        .query_row("SELECT version FROM hos_schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .expect("schema version present");
    assert_eq!(version, SCHEMA_VERSION);
    let tables = count(
        &connection,
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN (
            'hours_of_service', 'trips', 'trip_stops', 'log_activities'
        )",
    );
    assert_eq!(tables, 4, "expected four store tables to be created");
    Ok(())
}

#[rstest]
fn rejects_a_newer_schema_version() {
    let mut connection = Connection::open_in_memory().expect("open in-memory database");
    initialise_schema(&mut connection).expect("initial schema");
    connection
        .execute("UPDATE hos_schema_version SET version = 2", [])
        .expect("bump version");

    let err = initialise_schema(&mut connection).expect_err("version mismatch");

    assert!(matches!(
        err,
        StoreSchemaError::VersionMismatch {
            expected: 1,
            found: 2
        }
    ));
}

#[rstest]
fn first_load_creates_a_zeroed_record(store: Store) {
    let hours = store.load_hours("driver-1", day()).expect("load hours");

    assert_eq!(hours, HoursOfServiceState::new("driver-1", day()));
    let again = store.load_hours("driver-1", day()).expect("reload hours");
    assert_eq!(again, hours);
}

#[rstest]
fn saved_hours_replace_the_days_usage(store: Store) {
    let first = HoursOfServiceState::new("driver-1", day()).with_usage(4.0, 4.0, 3.0);
    let second = first.clone().with_usage(12.5, 12.5, 10.0);

    store.save_hours(&first).expect("save first");
    store.save_hours(&second).expect("save second");

    assert_eq!(store.load_hours("driver-1", day()).expect("load"), second);
    let next_day = day().succ_opt().expect("next day");
    assert_eq!(
        store.load_hours("driver-1", next_day).expect("load next day"),
        HoursOfServiceState::new("driver-1", next_day)
    );
}

#[rstest]
fn negative_usage_is_rejected_by_the_schema(store: Store) {
    let hours = HoursOfServiceState::new("driver-1", day()).with_usage(-1.0, 0.0, 0.0);

    let err = store.save_hours(&hours).expect_err("check constraint");

    assert!(matches!(
        err,
        SqliteStoreError::Sqlite {
            operation: "save hours",
            ..
        }
    ));
}

#[rstest]
fn trip_is_stored_with_stops_and_duty_log(store: Store, request: PlanRequest) {
    let plan = sample_plan();

    let trip_id = store
        .save_trip_plan("driver-1", &request, &plan)
        .expect("save trip");

    assert!(store.contains_trip(trip_id).expect("look up trip"));
    let connection = store.connection().expect("lock connection");
    let stops = count(
        &connection,
        "SELECT COUNT(*) FROM trip_stops WHERE trip_id = (SELECT MAX(id) FROM trips)",
    );
    assert_eq!(stops, 3);
    let activities = count(&connection, "SELECT COUNT(*) FROM log_activities");
    assert_eq!(
        activities,
        i64::try_from(plan.duty_log().len()).expect("small count")
    );
    let first_stop: String = connection
        .query_row(
            "SELECT stop_type FROM trip_stops WHERE position = 0",
            [],
            |row| row.get(0),
        )
        .expect("first stop");
    assert_eq!(first_stop, "START");
}

#[rstest]
fn trip_and_hours_commit_together(store: Store, request: PlanRequest) {
    let plan = sample_plan();
    let hours = HoursOfServiceState::new("driver-1", day()).with_usage(12.5, 12.5, 10.0);

    let trip_id = store
        .save_trip_with_hours("driver-1", &request, &plan, &hours)
        .expect("save trip and hours");

    assert!(store.contains_trip(trip_id).expect("look up trip"));
    assert_eq!(store.load_hours("driver-1", day()).expect("load"), hours);
}

#[rstest]
fn failed_hours_write_rolls_back_the_trip(store: Store, request: PlanRequest) {
    let plan = sample_plan();
    let hours = HoursOfServiceState::new("driver-1", day()).with_usage(-1.0, 0.0, 0.0);

    let err = store
        .save_trip_with_hours("driver-1", &request, &plan, &hours)
        .expect_err("check constraint");

    assert!(matches!(
        err,
        SqliteStoreError::Sqlite {
            operation: "save hours",
            ..
        }
    ));
    assert!(store.recent_trips("driver-1", 5).expect("list").is_empty());
    let connection = store.connection().expect("lock connection");
    assert_eq!(count(&connection, "SELECT COUNT(*) FROM trip_stops"), 0);
    assert_eq!(count(&connection, "SELECT COUNT(*) FROM log_activities"), 0);
    drop(connection);
    assert_eq!(
        store.load_hours("driver-1", day()).expect("load"),
        HoursOfServiceState::new("driver-1", day())
    );
}

#[rstest]
fn recent_trips_are_newest_first_and_limited(store: Store, request: PlanRequest) {
    let plan = sample_plan();
    let first = store
        .save_trip_plan("driver-1", &request, &plan)
        .expect("save first");
    let second = store
        .save_trip_plan("driver-1", &request, &plan)
        .expect("save second");
    store
        .save_trip_plan("driver-2", &request, &plan)
        .expect("save other driver");

    let trips = store.recent_trips("driver-1", 5).expect("list trips");

    let ids: Vec<_> = trips.iter().map(|trip| trip.id).collect();
    assert_eq!(ids, vec![second, first]);
    let newest = &trips[0];
    assert_eq!(newest.request, request);
    assert_eq!(newest.total_distance, plan.total_distance);
    assert_eq!(newest.required_stop_count, plan.required_stop_count);
    assert_eq!(newest.created_at, FixedClock::at(2024, 3, 1, 18, 30).0);
    assert_eq!(store.recent_trips("driver-1", 1).expect("list").len(), 1);
}

#[rstest]
fn opening_a_file_creates_missing_directories() {
    let temp = TempDir::new().expect("create temp dir");
    let base = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 temp dir");
    let path = base.join("state/hos.db");

    let store = SqliteHosStore::open(&path).expect("open on-disk store");
    let hours = HoursOfServiceState::new("driver-1", day()).with_usage(1.0, 1.0, 1.0);
    store.save_hours(&hours).expect("save hours");
    drop(store);

    let reopened = SqliteHosStore::open(&path).expect("reopen store");
    assert_eq!(reopened.load_hours("driver-1", day()).expect("load"), hours);
}
