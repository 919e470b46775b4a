//! Routing provider trait.

use geo::Coord;

use crate::{Deadline, RouteLeg};

use super::error::RoutingError;

/// Fetch a routed leg between two coordinates.
///
/// Calls are blocking. Implementations must check `deadline` before issuing
/// I/O and must not run past it.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use hos_core::{Deadline, RouteLeg, RoutingError, RoutingProvider};
///
/// struct StraightLine;
///
/// impl RoutingProvider for StraightLine {
///     fn route_between(
///         &self,
///         origin: Coord<f64>,
///         destination: Coord<f64>,
///         deadline: &Deadline,
///     ) -> Result<RouteLeg, RoutingError> {
///         deadline.check()?;
///         Ok(RouteLeg::new(origin, destination, 60.0, 1.0))
///     }
/// }
///
/// let leg = StraightLine.route_between(
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 1.0, y: 0.0 },
///     &Deadline::unbounded(),
/// )?;
/// assert_eq!(leg.distance_miles, 60.0);
/// # Ok::<(), RoutingError>(())
/// ```
pub trait RoutingProvider {
    /// Route from `origin` to `destination`.
    fn route_between(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
        deadline: &Deadline,
    ) -> Result<RouteLeg, RoutingError>;
}

impl<T: RoutingProvider + ?Sized> RoutingProvider for &T {
    fn route_between(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
        deadline: &Deadline,
    ) -> Result<RouteLeg, RoutingError> {
        (**self).route_between(origin, destination, deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    use crate::Interrupted;
    use crate::test_support::FixedRoutingProvider;

    fn origin() -> Coord<f64> {
        Coord { x: -87.6, y: 41.9 }
    }

    fn destination() -> Coord<f64> {
        Coord { x: -86.2, y: 39.8 }
    }

    #[rstest]
    fn returns_configured_leg() {
        let provider = FixedRoutingProvider::new(vec![RouteLeg::new(
            origin(),
            destination(),
            180.0,
            3.0,
        )]);
        let leg = provider
            .route_between(origin(), destination(), &Deadline::unbounded())
            .expect("configured leg should be returned");
        assert_eq!(leg.distance_miles, 180.0);
    }

    #[rstest]
    fn unknown_pair_has_no_route() {
        let provider = FixedRoutingProvider::new(Vec::new());
        let err = provider
            .route_between(origin(), destination(), &Deadline::unbounded())
            .expect_err("no leg configured");
        assert_eq!(err, RoutingError::NoRoute);
    }

    #[rstest]
    fn expired_deadline_interrupts_lookup() {
        let provider = FixedRoutingProvider::new(Vec::new());
        let err = provider
            .route_between(origin(), destination(), &Deadline::after(Duration::ZERO))
            .expect_err("deadline already passed");
        assert_eq!(err, RoutingError::Interrupted(Interrupted::DeadlineExceeded));
    }
}
