//! Planning error taxonomy.

use thiserror::Error;

use crate::{Interrupted, PlanRequestValidationError, RoutingError};

/// Boxed error raised by a persistence backend.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned while planning a trip.
///
/// The first failure aborts the whole plan; nothing is persisted and no
/// hours are applied.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The request was malformed; raised before any collaborator is called.
    #[error("invalid request: {0}")]
    Validation(#[from] PlanRequestValidationError),
    /// An address could not be resolved to a coordinate.
    #[error("could not resolve location {location:?}: {reason}")]
    InvalidLocation {
        /// Address as supplied by the caller.
        location: String,
        /// Why the lookup failed.
        reason: String,
    },
    /// A leg could not be obtained from the routing service.
    #[error("routing unavailable from {from:?} to {to:?}: {source}")]
    RoutingUnavailable {
        /// Leg origin address.
        from: String,
        /// Leg destination address.
        to: String,
        /// Underlying routing failure.
        #[source]
        source: RoutingError,
    },
    /// The deadline passed before the plan was complete.
    #[error("planning deadline exceeded")]
    DeadlineExceeded,
    /// The caller cancelled planning.
    #[error("planning cancelled")]
    Cancelled,
    /// Loading or saving through the persistence collaborator failed.
    #[error("failed to {operation}: {source}")]
    Persistence {
        /// Operation being attempted.
        operation: &'static str,
        /// Backend error.
        #[source]
        source: StoreError,
    },
    /// Another planning call panicked while holding the driver's lock.
    #[error("planning lock for driver {driver:?} is poisoned")]
    LockPoisoned {
        /// Driver whose lock was poisoned.
        driver: String,
    },
}

impl From<Interrupted> for PlanError {
    fn from(reason: Interrupted) -> Self {
        match reason {
            Interrupted::DeadlineExceeded => Self::DeadlineExceeded,
            Interrupted::Cancelled => Self::Cancelled,
        }
    }
}

impl PlanError {
    pub(crate) fn persistence<E>(operation: &'static str) -> impl FnOnce(E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |source| Self::Persistence {
            operation,
            source: Box::new(source),
        }
    }
}
