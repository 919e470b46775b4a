//! Test utilities for geocoding providers.

use geo::Coord;
use hos_core::{Deadline, GeocodingError, GeocodingProvider};

/// Stub `GeocodingProvider` for testing.
///
/// Forward lookups resolve every address to one coordinate and reverse
/// lookups return one place name, unless the stub was built to fail.
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use hos_core::{Deadline, GeocodingProvider};
/// use hos_data::geocoding::test_support::StubGeocoder;
///
/// let stub = StubGeocoder::with_place(Coord { x: -86.9, y: 40.4 }, "Lafayette, IN");
/// let name = stub
///     .reverse(Coord { x: 0.0, y: 0.0 }, &Deadline::unbounded())
///     .expect("stubbed place");
/// assert_eq!(name, "Lafayette, IN");
/// ```
#[derive(Debug, Clone)]
pub struct StubGeocoder {
    response: Result<(Coord<f64>, String), GeocodingError>,
}

impl StubGeocoder {
    /// Resolve every address to `coordinate` and every coordinate to `name`.
    pub fn with_place(coordinate: Coord<f64>, name: impl Into<String>) -> Self {
        Self {
            response: Ok((coordinate, name.into())),
        }
    }

    /// Fail every lookup with `error`.
    #[must_use]
    pub const fn with_error(error: GeocodingError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

impl GeocodingProvider for StubGeocoder {
    fn forward(&self, _address: &str, deadline: &Deadline) -> Result<Coord<f64>, GeocodingError> {
        deadline.check()?;
        self.response
            .as_ref()
            .map(|(coordinate, _)| *coordinate)
            .map_err(Clone::clone)
    }

    fn reverse(
        &self,
        _location: Coord<f64>,
        deadline: &Deadline,
    ) -> Result<String, GeocodingError> {
        deadline.check()?;
        self.response
            .as_ref()
            .map(|(_, name)| name.clone())
            .map_err(Clone::clone)
    }
}
