//! Obtain routed legs between coordinates.
//!
//! The [`RoutingProvider`] trait abstracts the external routing service. The
//! engine requests the current→pickup and pickup→dropoff legs one after the
//! other; any failure aborts the plan.

mod error;
mod provider;

pub use error::RoutingError;
pub use provider::RoutingProvider;
