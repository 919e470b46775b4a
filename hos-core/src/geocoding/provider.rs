//! Geocoding provider trait.

use geo::Coord;

use crate::Deadline;

use super::error::GeocodingError;

/// Resolve addresses to coordinates and back.
///
/// The engine uses [`GeocodingProvider::reverse`] only to label stops, and
/// holds the provider behind a reference so tests can inject a deterministic
/// fake.
pub trait GeocodingProvider {
    /// Resolve an address to a coordinate (`x` = longitude, `y` = latitude).
    fn forward(&self, address: &str, deadline: &Deadline) -> Result<Coord<f64>, GeocodingError>;

    /// Resolve a coordinate to a human-readable address.
    fn reverse(&self, location: Coord<f64>, deadline: &Deadline)
    -> Result<String, GeocodingError>;
}

impl<T: GeocodingProvider + ?Sized> GeocodingProvider for &T {
    fn forward(&self, address: &str, deadline: &Deadline) -> Result<Coord<f64>, GeocodingError> {
        (**self).forward(address, deadline)
    }

    fn reverse(
        &self,
        location: Coord<f64>,
        deadline: &Deadline,
    ) -> Result<String, GeocodingError> {
        (**self).reverse(location, deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    use crate::test_support::FixedGeocoder;

    #[fixture]
    fn geocoder() -> FixedGeocoder {
        FixedGeocoder::new()
            .with_address("Chicago, IL", Coord { x: -87.6, y: 41.9 })
            .with_place(Coord { x: -86.5, y: 40.4 }, "Lafayette, IN")
    }

    #[rstest]
    fn forward_resolves_known_address(geocoder: FixedGeocoder) {
        let coord = geocoder
            .forward("Chicago, IL", &Deadline::unbounded())
            .expect("known address");
        assert_eq!(coord, Coord { x: -87.6, y: 41.9 });
    }

    #[rstest]
    fn forward_reports_unknown_address(geocoder: FixedGeocoder) {
        let err = geocoder
            .forward("Atlantis", &Deadline::unbounded())
            .expect_err("unknown address");
        assert!(matches!(err, GeocodingError::NotFound { .. }));
    }

    #[rstest]
    fn reverse_resolves_known_place(geocoder: FixedGeocoder) {
        let place = geocoder
            .reverse(Coord { x: -86.5, y: 40.4 }, &Deadline::unbounded())
            .expect("known place");
        assert_eq!(place, "Lafayette, IN");
    }
}
