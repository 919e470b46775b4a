//! Resolve addresses to coordinates and coordinates to addresses.
//!
//! Forward lookups feed the routing provider; a failure there aborts the plan
//! with [`PlanError::InvalidLocation`](crate::PlanError::InvalidLocation).
//! Reverse lookups only refine stop labels.

mod error;
mod provider;

pub use error::GeocodingError;
pub use provider::GeocodingProvider;
