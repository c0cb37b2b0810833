//! Geofence circles
//!
//! Approximates a circle on the Earth's surface with a regular polygon,
//! using fixed kilometers-per-degree factors:
//! - d_lng = r_km / (111.320 * cos(center_lat))
//! - d_lat = r_km / 110.574
//!
//! This is a small-circle approximation, not a geodesic one. It is good to
//! well under 1% for radii of a few kilometers away from the poles.

use std::f64::consts::PI;

use thiserror::Error;

use crate::domain::{CoordinateRing, GeoPoint};

/// Vertex count used by the rental map's geofence overlay
pub const DEFAULT_SEGMENTS: usize = 74;

/// Kilometers per degree of longitude at the equator
pub const KM_PER_DEGREE_LNG: f64 = 111.320;

/// Kilometers per degree of latitude
pub const KM_PER_DEGREE_LAT: f64 = 110.574;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("circle undefined at the pole (latitude {0})")]
    PoleLatitude(f64),
    #[error("radius must be a positive finite number of meters, got {0}")]
    InvalidRadius(f64),
    #[error("a circle needs at least 3 segments, got {0}")]
    TooFewSegments(usize),
    #[error("center coordinates must be finite")]
    InvalidCenter,
}

/// Circle generation settings
#[derive(Debug, Clone, Copy)]
pub struct CircleBuilder {
    segments: usize,
}

impl Default for CircleBuilder {
    fn default() -> Self {
        Self {
            segments: DEFAULT_SEGMENTS,
        }
    }
}

impl CircleBuilder {
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Build the ring around `center`
    ///
    /// # Returns
    /// * `segments + 1` points, the last one repeating the first
    pub fn build(&self, center: GeoPoint, radius_m: f64) -> Result<CoordinateRing, GeometryError> {
        build_circle(center, radius_m, self.segments)
    }
}

/// Build a closed ring of `segments` vertices approximating a circle
///
/// Vertex `i` sits at angle `i / segments * 2π`, measured from east
/// (longitude is the x axis, latitude the y axis).
pub fn build_circle(
    center: GeoPoint,
    radius_m: f64,
    segments: usize,
) -> Result<CoordinateRing, GeometryError> {
    if !radius_m.is_finite() || radius_m <= 0.0 {
        return Err(GeometryError::InvalidRadius(radius_m));
    }
    if segments < 3 {
        return Err(GeometryError::TooFewSegments(segments));
    }

    let (lat, lng) = center.lat_lng();
    if !lat.is_finite() || !lng.is_finite() {
        return Err(GeometryError::InvalidCenter);
    }
    // cos(90°) is ~6e-17 in floating point, not zero, so check the input
    if lat.abs() >= 90.0 {
        return Err(GeometryError::PoleLatitude(lat));
    }

    let radius_km = radius_m / 1000.0;
    let d_lng = radius_km / (KM_PER_DEGREE_LNG * (lat * PI / 180.0).cos());
    let d_lat = radius_km / KM_PER_DEGREE_LAT;
    if !d_lng.is_finite() {
        return Err(GeometryError::InvalidRadius(radius_m));
    }

    let mut points = Vec::with_capacity(segments + 1);
    for i in 0..segments {
        let theta = (i as f64 / segments as f64) * (2.0 * PI);
        let x = d_lng * theta.cos();
        let y = d_lat * theta.sin();
        points.push(GeoPoint::from_raw(lat + y, lng + x));
    }
    points.push(points[0]);

    // segments >= 3 and the ring is closed by construction
    CoordinateRing::new(points).map_err(|_| GeometryError::TooFewSegments(segments))
}
