use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::distance::haversine_m;

/// Errors raised when building a validated coordinate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("coordinate components must be finite numbers")]
    NotFinite,
    #[error("not a \"lat,lng\" literal: {0:?}")]
    NotALiteral(String),
}

/// A WGS84 coordinate in decimal degrees
///
/// Stored as (latitude, longitude). Renderers that want GIS order
/// should use [`GeoPoint::lng_lat`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Create a point from user-facing input, checking the coordinate ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a point without range checks
    ///
    /// Decoded polylines and generated rings carry whatever the arithmetic
    /// produces, so they go through here.
    pub const fn from_raw(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// (lat, lng) tuple
    pub fn lat_lng(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// [lng, lat] pair, the axis order used by GeoJSON and map renderers
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Great-circle distance to another point in meters
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_m(*self, *other)
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(p: GeoPoint) -> Self {
        geo::Point::new(p.longitude, p.latitude)
    }
}

impl From<GeoPoint> for geo::Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        geo::coord! { x: p.longitude, y: p.latitude }
    }
}

impl From<geo::Coord<f64>> for GeoPoint {
    fn from(c: geo::Coord<f64>) -> Self {
        GeoPoint::from_raw(c.y, c.x)
    }
}
