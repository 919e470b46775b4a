use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Transaction};
use thiserror::Error;

/// Version recorded by [`initialise_schema`].
pub const SCHEMA_VERSION: i64 = 1;

/// Initialise the hours-of-service schema inside a SQLite database.
///
/// The function enables foreign keys, creates the driver-hours, trip, stop
/// and duty-log tables, and records the schema version. Existing databases
/// must already match the expected version; mismatches are rejected so
/// migrations can be applied explicitly.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use hos_data::store::initialise_schema;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&mut conn).expect("create schema");
///
/// let version: i64 = conn
///     .query_row("SELECT version FROM hos_schema_version LIMIT 1", [], |row| row.get(0))
///     .expect("read schema version");
/// assert_eq!(version, 1);
/// ```
pub fn initialise_schema(connection: &mut Connection) -> Result<(), StoreSchemaError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| StoreSchemaError::ForeignKeys { source })?;

    let transaction = connection
        .transaction()
        .map_err(|source| StoreSchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_tables(&transaction)?;
    create_indexes(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| StoreSchemaError::Migration {
            step: "commit schema transaction",
            source,
        })
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), StoreSchemaError> {
    run_migration_step(
        transaction,
        "create hours_of_service",
        "CREATE TABLE IF NOT EXISTS hours_of_service (
            driver TEXT NOT NULL CHECK (length(trim(driver)) > 0),
            date TEXT NOT NULL,
            cycle_used REAL NOT NULL CHECK (cycle_used >= 0),
            daily_used REAL NOT NULL CHECK (daily_used >= 0),
            driving_used REAL NOT NULL CHECK (driving_used >= 0),
            PRIMARY KEY (driver, date)
        ) WITHOUT ROWID",
    )?;
    run_migration_step(
        transaction,
        "create trips",
        "CREATE TABLE IF NOT EXISTS trips (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            driver TEXT NOT NULL,
            current_location TEXT NOT NULL,
            pickup_location TEXT NOT NULL,
            dropoff_location TEXT NOT NULL,
            total_distance REAL NOT NULL,
            total_driving_hours REAL NOT NULL,
            total_trip_hours REAL NOT NULL,
            elapsed_hours REAL NOT NULL,
            required_stop_count INTEGER NOT NULL CHECK (required_stop_count >= 0),
            created_at TEXT NOT NULL
        )",
    )?;
    run_migration_step(
        transaction,
        "create trip_stops",
        "CREATE TABLE IF NOT EXISTS trip_stops (
            trip_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            stop_type TEXT NOT NULL CHECK (
                stop_type IN ('START', 'PICKUP', 'DROPOFF', 'REST', 'OVERNIGHT', 'FUEL')
            ),
            location TEXT NOT NULL,
            arrival_time TEXT NOT NULL,
            departure_time TEXT NOT NULL,
            duration_hours REAL NOT NULL,
            duty_status TEXT NOT NULL,
            arrived_at TEXT NOT NULL,
            departed_at TEXT NOT NULL,
            PRIMARY KEY (trip_id, position),
            FOREIGN KEY (trip_id) REFERENCES trips(id) ON DELETE CASCADE
        ) WITHOUT ROWID",
    )?;
    run_migration_step(
        transaction,
        "create log_activities",
        "CREATE TABLE IF NOT EXISTS log_activities (
            trip_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            status TEXT NOT NULL CHECK (
                status IN ('OFF_DUTY', 'ON_DUTY', 'DRIVING', 'SLEEPER')
            ),
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            description TEXT NOT NULL,
            location TEXT,
            PRIMARY KEY (trip_id, position),
            FOREIGN KEY (trip_id) REFERENCES trips(id) ON DELETE CASCADE
        ) WITHOUT ROWID",
    )
}

fn create_indexes(transaction: &Transaction<'_>) -> Result<(), StoreSchemaError> {
    run_migration_step(
        transaction,
        "index trips by driver",
        "CREATE INDEX IF NOT EXISTS idx_trips_driver_created
            ON trips(driver, created_at, id)",
    )
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), StoreSchemaError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS hos_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing_version: Option<i64> = transaction
        .query_row("SELECT version FROM hos_schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|source| StoreSchemaError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing_version {
        Some(SCHEMA_VERSION) => Ok(()),
        Some(found) => Err(StoreSchemaError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO hos_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| StoreSchemaError::Migration {
                step: "record schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), StoreSchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| StoreSchemaError::Migration { step, source })
}

/// Errors raised when initialising the store schema.
#[derive(Debug, Error)]
pub enum StoreSchemaError {
    /// `PRAGMA foreign_keys` could not be enabled.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
    /// A migration statement failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Step being executed.
        step: &'static str,
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
    /// The database was created by a different schema version.
    #[error(
        "expected store schema version {expected} but found {found}; apply migrations before retrying"
    )]
    VersionMismatch {
        /// Version this build understands.
        expected: i64,
        /// Version found in the database.
        found: i64,
    },
}
