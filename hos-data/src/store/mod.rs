//! SQLite persistence for driver hours and accepted trips.
//!
//! The module is split into focused submodules:
//! - `schema` materialises the tables behind the store.
//! - [`SqliteHosStore`] implements [`hos_core::HoursOfServiceStore`] and
//!   [`hos_core::TripPlanStore`] on top of them.
#![forbid(unsafe_code)]

mod fs;
mod schema;
mod sqlite;

pub use schema::{SCHEMA_VERSION, StoreSchemaError, initialise_schema};
pub use sqlite::{SqliteHosStore, SqliteStoreError};

#[cfg(test)]
mod tests;
