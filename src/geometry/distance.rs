use geo::{Distance, Haversine, Point};

use crate::domain::GeoPoint;

/// Great-circle distance in meters on a spherical Earth (mean radius 6371.0088 km)
pub fn haversine_m(from: GeoPoint, to: GeoPoint) -> f64 {
    Haversine::distance(Point::from(from), Point::from(to))
}

/// Total length of a path in meters
pub fn path_length_m(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| haversine_m(w[0], w[1])).sum()
}
