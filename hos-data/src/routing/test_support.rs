//! Test utilities for routing providers.
//!
//! This module provides [`StubRoutingProvider`], a deterministic test double
//! for [`RoutingProvider`] that returns a pre-configured response without
//! making HTTP requests.

use std::sync::atomic::{AtomicUsize, Ordering};

use geo::Coord;
use hos_core::{Deadline, RouteLeg, RoutingError, RoutingProvider};

/// Stub `RoutingProvider` for testing.
///
/// Every call returns the same response, with the leg's endpoints replaced
/// by the requested coordinates.
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use hos_core::{Deadline, RouteLeg, RoutingProvider};
/// use hos_data::routing::test_support::StubRoutingProvider;
///
/// let origin = Coord { x: 0.0, y: 0.0 };
/// let provider = StubRoutingProvider::with_leg(RouteLeg::new(origin, origin, 120.0, 2.0));
///
/// let leg = provider
///     .route_between(origin, Coord { x: 1.0, y: 1.0 }, &Deadline::unbounded())
///     .expect("stubbed leg");
/// assert_eq!(leg.distance_miles, 120.0);
/// assert_eq!(provider.calls(), 1);
/// ```
#[derive(Debug)]
pub struct StubRoutingProvider {
    response: StubResponse,
    calls: AtomicUsize,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Leg(RouteLeg),
    Error(RoutingError),
}

impl StubRoutingProvider {
    /// Create a provider that returns the given leg.
    #[must_use]
    pub const fn with_leg(leg: RouteLeg) -> Self {
        Self {
            response: StubResponse::Leg(leg),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a provider that always fails with `error`.
    #[must_use]
    pub const fn with_error(error: RoutingError) -> Self {
        Self {
            response: StubResponse::Error(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls that reached the stub after the deadline check.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RoutingProvider for StubRoutingProvider {
    fn route_between(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
        deadline: &Deadline,
    ) -> Result<RouteLeg, RoutingError> {
        deadline.check()?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            StubResponse::Leg(leg) => Ok(RouteLeg {
                origin,
                destination,
                ..leg.clone()
            }),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}
