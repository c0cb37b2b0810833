pub mod nominatim;

pub use nominatim::{GeocodedPlace, geocode};

use anyhow::Result;
use serde::Serialize;

use crate::config::GeocoderConfig;
use crate::domain::GeoPoint;
use crate::parse::try_parse_lat_lng;

/// Where a location string ended up
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Location {
    /// The input was a "lat,lng" literal; no network call was made
    Literal { point: GeoPoint },
    /// The input was free text and went through the geocoder
    Geocoded(GeocodedPlace),
}

impl Location {
    pub fn point(&self) -> GeoPoint {
        match self {
            Location::Literal { point } => *point,
            Location::Geocoded(place) => place.point,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Location::Literal { .. })
    }
}

/// Resolve user-typed location text
///
/// Coordinate literals are parsed locally; everything else is geocoded.
pub fn resolve_location(input: &str, config: &GeocoderConfig) -> Result<Location> {
    if let Some(point) = try_parse_lat_lng(input) {
        tracing::debug!(input, "input is a coordinate literal");
        return Ok(Location::Literal { point });
    }

    geocode(input.trim(), config).map(Location::Geocoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_skips_geocoder() {
        // unroutable URL: a network call would fail the test
        let config = GeocoderConfig {
            url: "http://127.0.0.1:9/search".to_string(),
            ..GeocoderConfig::default()
        };
        let location = resolve_location(" 21.0285, 105.8542 ", &config).unwrap();
        assert!(location.is_literal());
        assert_eq!(location.point().lat_lng(), (21.0285, 105.8542));
    }

    #[test]
    fn test_location_serialization() {
        let literal = Location::Literal {
            point: GeoPoint::from_raw(1.0, 2.0),
        };
        let json = serde_json::to_value(&literal).unwrap();
        assert_eq!(json["source"], "literal");
        assert_eq!(json["point"]["latitude"], 1.0);

        let geocoded = Location::Geocoded(GeocodedPlace {
            point: GeoPoint::from_raw(3.0, 4.0),
            display_name: "Somewhere".to_string(),
        });
        let json = serde_json::to_value(&geocoded).unwrap();
        assert_eq!(json["source"], "geocoded");
        assert_eq!(json["display_name"], "Somewhere");
        assert_eq!(geocoded.point().lat_lng(), (3.0, 4.0));
    }
}
