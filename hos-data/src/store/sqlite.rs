use std::sync::{Mutex, MutexGuard};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{NaiveDate, NaiveDateTime};
use hos_core::{
    Clock, HoursOfServiceState, HoursOfServiceStore, PlanRequest, SystemClock, TripId, TripPlan,
    TripPlanStore, TripSummary,
};
use log::debug;
use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Row, Transaction};
use thiserror::Error;

use super::fs::ensure_parent_dir;
use super::schema::{StoreSchemaError, initialise_schema};

/// SQLite-backed driver hours and trip history.
///
/// One connection is shared behind a mutex, so the store can sit behind a
/// multi-threaded [`hos_core::TripService`]. `created_at` stamps come from
/// the injected [`Clock`].
///
/// # Examples
/// ```
/// use chrono::{NaiveDate, NaiveDateTime};
/// use hos_core::HoursOfServiceStore;
/// use hos_data::store::SqliteHosStore;
///
/// let store = SqliteHosStore::open_in_memory().expect("open store");
/// let date = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
/// let hours = store.load_hours("driver-1", date).expect("load hours");
/// assert_eq!(hours.cycle_used, 0.0);
/// ```
pub struct SqliteHosStore<C = SystemClock> {
    connection: Mutex<Connection>,
    clock: C,
}

impl<C: std::fmt::Debug> std::fmt::Debug for SqliteHosStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteHosStore")
            .field("connection", &"<rusqlite::Connection>")
            .field("clock", &self.clock)
            .finish()
    }
}

impl SqliteHosStore {
    /// Open or create the database at `path`, creating missing parent
    /// directories.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Directory`] when the parent directory
    /// cannot be created, [`SqliteStoreError::Open`] when SQLite cannot open
    /// the file and [`SqliteStoreError::Schema`] when initialisation fails.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteStoreError> {
        ensure_parent_dir(path).map_err(|source| SqliteStoreError::Directory {
            path: path.to_path_buf(),
            source,
        })?;
        let connection = Connection::open(path).map_err(|source| SqliteStoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(connection)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error when SQLite cannot allocate the database or the
    /// schema cannot be created.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteStoreError::Open {
                path: Utf8PathBuf::from(":memory:"),
                source,
            })?;
        Self::from_connection(connection)
    }

    fn from_connection(mut connection: Connection) -> Result<Self, SqliteStoreError> {
        initialise_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
            clock: SystemClock,
        })
    }
}

impl<C> SqliteHosStore<C> {
    /// Replace the clock used to stamp stored trips.
    pub fn with_clock<D: Clock>(self, clock: D) -> SqliteHosStore<D> {
        SqliteHosStore {
            connection: self.connection,
            clock,
        }
    }

    pub(super) fn connection(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Poisoned)
    }

    /// Whether a trip with `trip_id` is stored.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Sqlite`] when the query fails.
    pub fn contains_trip(&self, trip_id: TripId) -> Result<bool, SqliteStoreError> {
        self.connection()?
            .query_row("SELECT 1 FROM trips WHERE id = ?1", [trip_id], |_| Ok(()))
            .optional()
            .map(|found| found.is_some())
            .map_err(sqlite("look up trip"))
    }
}

fn sqlite(operation: &'static str) -> impl FnOnce(SqliteError) -> SqliteStoreError {
    move |source| SqliteStoreError::Sqlite { operation, source }
}

impl<C> HoursOfServiceStore for SqliteHosStore<C> {
    type Error = SqliteStoreError;

    fn load_hours(
        &self,
        driver: &str,
        date: NaiveDate,
    ) -> Result<HoursOfServiceState, Self::Error> {
        let connection = self.connection()?;
        connection
            .execute(
                "INSERT OR IGNORE INTO hours_of_service
                    (driver, date, cycle_used, daily_used, driving_used)
                 VALUES (?1, ?2, 0.0, 0.0, 0.0)",
                (driver, date),
            )
            .map_err(sqlite("create zeroed hours"))?;
        connection
            .query_row(
                "SELECT cycle_used, daily_used, driving_used
                 FROM hours_of_service WHERE driver = ?1 AND date = ?2",
                (driver, date),
                |row| {
                    Ok(HoursOfServiceState::new(driver, date).with_usage(
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                    ))
                },
            )
            .map_err(sqlite("load hours"))
    }

    fn save_hours(&self, hours: &HoursOfServiceState) -> Result<(), Self::Error> {
        upsert_hours(&*self.connection()?, hours)
    }
}

impl<C: Clock> TripPlanStore for SqliteHosStore<C> {
    type Error = SqliteStoreError;

    fn save_trip_plan(
        &self,
        driver: &str,
        request: &PlanRequest,
        plan: &TripPlan,
    ) -> Result<TripId, Self::Error> {
        let created_at = self.clock.now();
        let mut connection = self.connection()?;
        let transaction = connection
            .transaction()
            .map_err(sqlite("begin trip transaction"))?;
        let trip_id = insert_trip(&transaction, driver, request, plan, created_at)?;
        transaction
            .commit()
            .map_err(sqlite("commit trip transaction"))?;
        debug!(
            "stored trip {trip_id} for {driver} with {} stops",
            plan.stops.len()
        );
        Ok(trip_id)
    }

    fn save_trip_with_hours(
        &self,
        driver: &str,
        request: &PlanRequest,
        plan: &TripPlan,
        hours: &HoursOfServiceState,
    ) -> Result<TripId, Self::Error> {
        let created_at = self.clock.now();
        let mut connection = self.connection()?;
        let transaction = connection
            .transaction()
            .map_err(sqlite("begin trip transaction"))?;
        let trip_id = insert_trip(&transaction, driver, request, plan, created_at)?;
        upsert_hours(&transaction, hours)?;
        transaction
            .commit()
            .map_err(sqlite("commit trip transaction"))?;
        debug!(
            "stored trip {trip_id} for {driver} with {} stops and daily usage {:.2}h",
            plan.stops.len(),
            hours.daily_used
        );
        Ok(trip_id)
    }

    fn recent_trips(&self, driver: &str, limit: usize) -> Result<Vec<TripSummary>, Self::Error> {
        let connection = self.connection()?;
        let mut statement = connection
            .prepare_cached(
                "SELECT id, driver, current_location, pickup_location, dropoff_location,
                        total_distance, total_driving_hours, total_trip_hours,
                        required_stop_count, created_at
                 FROM trips
                 WHERE driver = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2",
            )
            .map_err(sqlite("prepare recent trips"))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = statement
            .query_map((driver, limit), summary_from_row)
            .map_err(sqlite("query recent trips"))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(sqlite("read recent trips"))
    }
}

fn upsert_hours(
    connection: &Connection,
    hours: &HoursOfServiceState,
) -> Result<(), SqliteStoreError> {
    connection
        .execute(
            "INSERT INTO hours_of_service
                (driver, date, cycle_used, daily_used, driving_used)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (driver, date) DO UPDATE SET
                cycle_used = excluded.cycle_used,
                daily_used = excluded.daily_used,
                driving_used = excluded.driving_used",
            (
                hours.driver.as_str(),
                hours.date,
                hours.cycle_used,
                hours.daily_used,
                hours.driving_used,
            ),
        )
        .map(|_| ())
        .map_err(sqlite("save hours"))
}

/// Insert the trip row with its stops and duty log inside `transaction`.
fn insert_trip(
    transaction: &Transaction<'_>,
    driver: &str,
    request: &PlanRequest,
    plan: &TripPlan,
    created_at: NaiveDateTime,
) -> Result<TripId, SqliteStoreError> {
    transaction
        .execute(
            "INSERT INTO trips (
                driver, current_location, pickup_location, dropoff_location,
                total_distance, total_driving_hours, total_trip_hours,
                elapsed_hours, required_stop_count, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            (
                driver,
                request.current_location.as_str(),
                request.pickup_location.as_str(),
                request.dropoff_location.as_str(),
                plan.total_distance,
                plan.total_driving_hours,
                plan.total_trip_hours,
                plan.elapsed_hours,
                plan.required_stop_count,
                created_at,
            ),
        )
        .map_err(sqlite("insert trip"))?;
    let trip_id = transaction.last_insert_rowid();

    insert_stops(transaction, trip_id, plan)?;
    insert_duty_log(transaction, trip_id, plan)?;
    Ok(trip_id)
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<TripSummary> {
    Ok(TripSummary {
        id: row.get(0)?,
        driver: row.get(1)?,
        request: PlanRequest::new(
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ),
        total_distance: row.get(5)?,
        total_driving_hours: row.get(6)?,
        total_trip_hours: row.get(7)?,
        required_stop_count: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn insert_stops(
    transaction: &Transaction<'_>,
    trip_id: TripId,
    plan: &TripPlan,
) -> Result<(), SqliteStoreError> {
    let mut insert = transaction
        .prepare_cached(
            "INSERT INTO trip_stops (
                trip_id, position, stop_type, location, arrival_time, departure_time,
                duration_hours, duty_status, arrived_at, departed_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .map_err(sqlite("prepare insert stop"))?;
    for (position, stop) in plan.stops.iter().enumerate() {
        insert
            .execute((
                trip_id,
                position,
                stop.stop_type.as_str(),
                stop.location.as_str(),
                stop.arrival_time.as_str(),
                stop.departure_time.as_str(),
                stop.duration_hours,
                stop.duty_status.as_str(),
                stop.arrived_at,
                stop.departed_at,
            ))
            .map_err(sqlite("insert stop"))?;
    }
    Ok(())
}

fn insert_duty_log(
    transaction: &Transaction<'_>,
    trip_id: TripId,
    plan: &TripPlan,
) -> Result<(), SqliteStoreError> {
    let mut insert = transaction
        .prepare_cached(
            "INSERT INTO log_activities (
                trip_id, position, status, start_time, end_time, description, location
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(sqlite("prepare insert log activity"))?;
    for (position, activity) in plan.duty_log().iter().enumerate() {
        insert
            .execute((
                trip_id,
                position,
                activity.status.as_str(),
                activity.start_time.as_str(),
                activity.end_time.as_str(),
                activity.description.as_str(),
                activity.location.as_deref(),
            ))
            .map_err(sqlite("insert log activity"))?;
    }
    Ok(())
}

/// Errors raised by [`SqliteHosStore`].
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// The database's parent directory could not be created.
    #[error("failed to create directory for SQLite database at {path}")]
    Directory {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// SQLite could not open the database.
    #[error("failed to open SQLite database at {path}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
    /// Schema initialisation failed.
    #[error(transparent)]
    Schema(#[from] StoreSchemaError),
    /// A query or statement failed.
    #[error("failed to {operation}")]
    Sqlite {
        /// What the store was doing.
        operation: &'static str,
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
    /// A thread panicked while holding the connection.
    #[error("SQLite connection lock is poisoned")]
    Poisoned,
}
