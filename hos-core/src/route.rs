//! Routed legs supplied by a [`RoutingProvider`](crate::RoutingProvider).
//!
//! A leg carries its total distance and duration plus distance-stamped step
//! hints used to label stops inserted along it.

use geo::Coord;

/// One manoeuvre along a leg, stamped with the distance travelled so far.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteStep {
    /// Distance from the leg origin to the end of this step, in miles.
    pub cumulative_miles: f64,
    /// Road or place name reported by the router, if any.
    pub name: Option<String>,
    /// Coordinate of the manoeuvre, usable for a reverse lookup.
    pub location: Option<Coord<f64>>,
}

impl RouteStep {
    /// Construct a step with a road name hint.
    pub fn named(cumulative_miles: f64, name: impl Into<String>) -> Self {
        Self {
            cumulative_miles,
            name: Some(name.into()),
            location: None,
        }
    }

    /// Construct a step carrying only a coordinate hint.
    #[must_use]
    pub const fn at(cumulative_miles: f64, location: Coord<f64>) -> Self {
        Self {
            cumulative_miles,
            name: None,
            location: Some(location),
        }
    }

    /// Road name, ignoring blank strings routers emit for unnamed roads.
    #[must_use]
    pub fn road_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|name| !name.is_empty())
    }
}

/// A routed point-to-point segment.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use hos_core::{RouteLeg, RouteStep};
///
/// let leg = RouteLeg::new(
///     Coord { x: -87.6, y: 41.9 },
///     Coord { x: -86.2, y: 39.8 },
///     180.0,
///     3.0,
/// )
/// .with_steps(vec![RouteStep::named(180.0, "I-65 S")]);
/// assert!((leg.average_speed_mph() - 60.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteLeg {
    /// Start coordinate (`x` = longitude, `y` = latitude).
    pub origin: Coord<f64>,
    /// End coordinate.
    pub destination: Coord<f64>,
    /// Total routed distance in miles.
    pub distance_miles: f64,
    /// Total routed driving time in hours.
    pub duration_hours: f64,
    /// Ordered step hints.
    pub steps: Vec<RouteStep>,
}

impl RouteLeg {
    /// Construct a leg without step hints.
    #[must_use]
    pub const fn new(
        origin: Coord<f64>,
        destination: Coord<f64>,
        distance_miles: f64,
        duration_hours: f64,
    ) -> Self {
        Self {
            origin,
            destination,
            distance_miles,
            duration_hours,
            steps: Vec::new(),
        }
    }

    /// Attach step hints.
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<RouteStep>) -> Self {
        self.steps = steps;
        self
    }

    /// Leg-average speed; zero for a leg with no duration.
    #[must_use]
    pub fn average_speed_mph(&self) -> f64 {
        if self.duration_hours > 0.0 {
            self.distance_miles / self.duration_hours
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("  "), None)]
    #[case(Some(""), None)]
    #[case(None, None)]
    #[case(Some(" US-30 "), Some("US-30"))]
    fn road_name_ignores_blank_names(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        let step = RouteStep {
            cumulative_miles: 1.0,
            name: raw.map(str::to_owned),
            location: None,
        };
        assert_eq!(step.road_name(), expected);
    }

    #[rstest]
    fn zero_duration_leg_has_zero_speed() {
        let leg = RouteLeg::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.0 }, 5.0, 0.0);
        assert_eq!(leg.average_speed_mph(), 0.0);
    }
}
