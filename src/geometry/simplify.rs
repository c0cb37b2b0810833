use geo::{LineString, Simplify};

use super::circle::KM_PER_DEGREE_LAT;
use crate::domain::GeoPoint;

/// Simplify a decoded route with Ramer-Douglas-Peucker
///
/// `tolerance_m` is converted to degrees with the latitude factor, so the
/// tolerance is exact north-south and slightly generous east-west away
/// from the equator. Paths with fewer than 4 points, or a non-positive
/// tolerance, are returned unchanged.
pub fn simplify_path(points: &[GeoPoint], tolerance_m: f64) -> Vec<GeoPoint> {
    if points.len() < 4 || tolerance_m.is_nan() || tolerance_m <= 0.0 {
        return points.to_vec();
    }

    let line: LineString<f64> = points.iter().map(|&p| geo::Coord::from(p)).collect();
    let simplified = line.simplify(&meters_to_degrees(tolerance_m));

    simplified.0.into_iter().map(GeoPoint::from).collect()
}

/// Convert a ground distance to degrees of latitude
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / 1000.0 / KM_PER_DEGREE_LAT
}
