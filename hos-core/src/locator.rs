//! Resolve a point along a leg to a stop label.
//!
//! The scan is pure: it walks the leg's cumulative step distances and picks
//! the first step at or past `ratio × distance`. Turning a bare coordinate
//! into an address is delegated to an injected [`GeocodingProvider`].

use log::{debug, warn};

use crate::geocoding::{GeocodingError, GeocodingProvider};
use crate::{Deadline, Interrupted, RouteLeg, RouteStep, StopType};

const REST_AREA: &str = "Rest Area";
const FUEL_STATION: &str = "Fuel Station";

/// Find the first step whose cumulative distance reaches `ratio` of the leg.
///
/// `ratio` is clamped to `[0, 1]`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use hos_core::{RouteLeg, RouteStep, step_at_ratio};
///
/// let leg = RouteLeg::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }, 100.0, 2.0)
///     .with_steps(vec![RouteStep::named(40.0, "Main St"), RouteStep::named(100.0, "I-80")]);
/// let step = step_at_ratio(&leg, 0.5).expect("a step covers the midpoint");
/// assert_eq!(step.road_name(), Some("I-80"));
/// ```
#[must_use]
pub fn step_at_ratio(leg: &RouteLeg, ratio: f64) -> Option<&RouteStep> {
    let target = ratio.clamp(0.0, 1.0) * leg.distance_miles;
    leg.steps
        .iter()
        .find(|step| step.cumulative_miles >= target)
}

/// Generic label used when no hint is available.
#[must_use]
pub const fn generic_label(kind: StopType) -> &'static str {
    match kind {
        StopType::Fuel => FUEL_STATION,
        _ => REST_AREA,
    }
}

/// Labels REST, OVERNIGHT and FUEL stops.
///
/// Without a reverse geocoder only road names are used.
#[derive(Clone, Copy)]
pub struct StopLocator<'a> {
    reverse: Option<&'a dyn GeocodingProvider>,
}

impl std::fmt::Debug for StopLocator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopLocator")
            .field("reverse", &self.reverse.map(|_| "<dyn GeocodingProvider>"))
            .finish()
    }
}

impl<'a> StopLocator<'a> {
    /// A locator that never performs reverse lookups.
    #[must_use]
    pub const fn offline() -> Self {
        Self { reverse: None }
    }

    /// A locator that resolves coordinate-only hints through `reverse`.
    #[must_use]
    pub const fn with_reverse(reverse: &'a dyn GeocodingProvider) -> Self {
        Self {
            reverse: Some(reverse),
        }
    }

    /// Label a `kind` stop at `ratio` of `leg`.
    ///
    /// A failed reverse lookup falls back to the generic label; only an
    /// expired deadline or cancellation aborts.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] when the deadline fires during a lookup.
    pub fn locate(
        &self,
        leg: &RouteLeg,
        ratio: f64,
        kind: StopType,
        deadline: &Deadline,
    ) -> Result<String, Interrupted> {
        let base = generic_label(kind);
        let Some(step) = step_at_ratio(leg, ratio) else {
            return Ok(base.to_owned());
        };
        if let Some(name) = step.road_name() {
            return Ok(format!("{base} near {name}"));
        }
        let (Some(reverse), Some(location)) = (self.reverse, step.location) else {
            return Ok(base.to_owned());
        };
        match reverse.reverse(location, deadline) {
            Ok(address) => {
                debug!("reverse lookup at ({}, {}) gave {address:?}", location.x, location.y);
                Ok(format!("{base} near {address}"))
            }
            Err(GeocodingError::Interrupted(reason)) => Err(reason),
            Err(err) => {
                warn!("reverse lookup failed, using generic {kind} label: {err}");
                Ok(base.to_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    use crate::test_support::FixedGeocoder;

    const MIDWAY: Coord<f64> = Coord { x: -86.9, y: 41.1 };

    #[fixture]
    fn leg() -> RouteLeg {
        RouteLeg::new(Coord { x: -87.6, y: 41.9 }, Coord { x: -86.2, y: 39.8 }, 180.0, 3.0)
            .with_steps(vec![
                RouteStep::named(20.0, "Lake Shore Dr"),
                RouteStep::at(90.0, MIDWAY),
                RouteStep::named(180.0, ""),
            ])
    }

    #[rstest]
    #[case(0.0, Some(20.0))]
    #[case(0.1, Some(20.0))]
    #[case(0.2, Some(90.0))]
    #[case(0.5, Some(90.0))]
    #[case(1.0, Some(180.0))]
    #[case(1.7, Some(180.0))]
    fn scan_picks_first_step_at_or_past_target(
        leg: RouteLeg,
        #[case] ratio: f64,
        #[case] expected: Option<f64>,
    ) {
        let found = step_at_ratio(&leg, ratio).map(|step| step.cumulative_miles);
        assert_eq!(found, expected);
    }

    #[rstest]
    fn named_step_produces_near_label(leg: RouteLeg) {
        let label = StopLocator::offline()
            .locate(&leg, 0.05, StopType::Rest, &Deadline::unbounded())
            .expect("offline lookups cannot be interrupted");
        assert_eq!(label, "Rest Area near Lake Shore Dr");
    }

    #[rstest]
    fn fuel_stops_use_fuel_label(leg: RouteLeg) {
        let label = StopLocator::offline()
            .locate(&leg, 0.05, StopType::Fuel, &Deadline::unbounded())
            .expect("offline lookups cannot be interrupted");
        assert_eq!(label, "Fuel Station near Lake Shore Dr");
    }

    #[rstest]
    fn unnamed_step_without_reverse_lookup_is_generic(leg: RouteLeg) {
        let label = StopLocator::offline()
            .locate(&leg, 0.5, StopType::Overnight, &Deadline::unbounded())
            .expect("offline lookups cannot be interrupted");
        assert_eq!(label, "Rest Area");
    }

    #[rstest]
    fn coordinate_hint_is_reverse_geocoded(leg: RouteLeg) {
        let geocoder = FixedGeocoder::new().with_place(MIDWAY, "Rensselaer, IN");
        let label = StopLocator::with_reverse(&geocoder)
            .locate(&leg, 0.5, StopType::Rest, &Deadline::unbounded())
            .expect("lookup should succeed");
        assert_eq!(label, "Rest Area near Rensselaer, IN");
    }

    #[rstest]
    fn failed_reverse_lookup_falls_back(leg: RouteLeg) {
        let geocoder = FixedGeocoder::new();
        let label = StopLocator::with_reverse(&geocoder)
            .locate(&leg, 0.5, StopType::Fuel, &Deadline::unbounded())
            .expect("lookup failures fall back");
        assert_eq!(label, "Fuel Station");
    }

    #[rstest]
    fn expired_deadline_aborts_reverse_lookup(leg: RouteLeg) {
        let geocoder = FixedGeocoder::new().with_place(MIDWAY, "Rensselaer, IN");
        let err = StopLocator::with_reverse(&geocoder)
            .locate(&leg, 0.5, StopType::Rest, &Deadline::after(Duration::ZERO))
            .expect_err("deadline already passed");
        assert_eq!(err, Interrupted::DeadlineExceeded);
    }

    #[rstest]
    fn leg_without_steps_is_generic() {
        let leg = RouteLeg::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }, 10.0, 1.0);
        let label = StopLocator::offline()
            .locate(&leg, 0.5, StopType::Fuel, &Deadline::unbounded())
            .expect("offline lookups cannot be interrupted");
        assert_eq!(label, "Fuel Station");
    }
}
