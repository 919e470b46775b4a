//! Nominatim API response types for the search and reverse endpoints.
//!
//! Nominatim encodes coordinates as decimal strings; [`Place::coordinate`]
//! parses them into a `geo::Coord`.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Overview/>

use geo::Coord;
use serde::Deserialize;

/// One `jsonv2` search or reverse result.
#[derive(Debug, Deserialize)]
pub struct Place {
    /// Latitude as a decimal string.
    pub lat: String,
    /// Longitude as a decimal string.
    pub lon: String,
    /// Full human-readable address.
    pub display_name: String,
}

impl Place {
    /// Parse the result position (`x` = longitude, `y` = latitude).
    ///
    /// Returns `None` when either component is not a finite number.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coord<f64>> {
        let x = self.lon.trim().parse::<f64>().ok()?;
        let y = self.lat.trim().parse::<f64>().ok()?;
        (x.is_finite() && y.is_finite()).then_some(Coord { x, y })
    }
}

/// Reverse lookup body: either a place or an error message.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ReverseResponse {
    /// The coordinate resolved to a place.
    Found(Place),
    /// Nominatim could not resolve the coordinate.
    Failed {
        /// Error text, e.g. `"Unable to geocode"`.
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_search_results() {
        let json = r#"[{
            "place_id": 1,
            "lat": "41.8755616",
            "lon": "-87.6244212",
            "display_name": "Chicago, Cook County, Illinois, United States"
        }]"#;

        let places: Vec<Place> = serde_json::from_str(json).expect("should deserialise");

        assert_eq!(places.len(), 1);
        assert_eq!(
            places[0].coordinate(),
            Some(Coord {
                x: -87.624_421_2,
                y: 41.875_561_6
            })
        );
    }

    #[test]
    fn deserialise_reverse_failure() {
        let json = r#"{"error": "Unable to geocode"}"#;

        let response: ReverseResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(matches!(response, ReverseResponse::Failed { ref error } if error == "Unable to geocode"));
    }

    #[test]
    fn unparsable_coordinate_is_rejected() {
        let place = Place {
            lat: "north".to_owned(),
            lon: "-87.6".to_owned(),
            display_name: "Nowhere".to_owned(),
        };

        assert_eq!(place.coordinate(), None);
    }
}
