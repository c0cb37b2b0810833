use geo::{Contains, LineString, Polygon};
use thiserror::Error;

use super::GeoPoint;

/// Smallest closed ring: three distinct vertices plus the closing point
pub const MIN_RING_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RingError {
    #[error("ring needs at least {MIN_RING_LEN} points, got {0}")]
    TooShort(usize),
    #[error("ring is not closed: first and last points differ")]
    NotClosed,
}

/// A closed polygon boundary: first point == last point
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateRing {
    points: Vec<GeoPoint>,
}

impl CoordinateRing {
    /// Wrap points that already form a closed ring
    pub fn new(points: Vec<GeoPoint>) -> Result<Self, RingError> {
        if points.len() < MIN_RING_LEN {
            return Err(RingError::TooShort(points.len()));
        }
        if points.first() != points.last() {
            return Err(RingError::NotClosed);
        }

        Ok(Self { points })
    }

    /// Close an open vertex list by repeating its first point, then validate
    pub fn close(mut points: Vec<GeoPoint>) -> Result<Self, RingError> {
        if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied())
            && first != last
        {
            points.push(first);
        }

        Self::new(points)
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Ring vertices without the closing point
    pub fn vertices(&self) -> &[GeoPoint] {
        &self.points[..self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Never true for a ring built through `new` or `close`
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }

    /// Polygon in (x = lng, y = lat) space
    pub fn to_polygon(&self) -> Polygon<f64> {
        let exterior: LineString<f64> =
            self.points.iter().map(|&p| geo::Coord::from(p)).collect();
        Polygon::new(exterior, vec![])
    }

    /// Planar point-in-polygon test in degree space
    ///
    /// Points exactly on the boundary are not contained.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.to_polygon().contains(&geo::Point::from(*point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::from_raw(0.0, 0.0),
            GeoPoint::from_raw(0.0, 1.0),
            GeoPoint::from_raw(1.0, 1.0),
            GeoPoint::from_raw(1.0, 0.0),
        ]
    }

    #[test]
    fn test_new_requires_closure() {
        assert_eq!(CoordinateRing::new(square()), Err(RingError::NotClosed));

        let mut closed = square();
        closed.push(closed[0]);
        let ring = CoordinateRing::new(closed).unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.vertices().len(), 4);
    }

    #[test]
    fn test_close_appends_first_point() {
        let ring = CoordinateRing::close(square()).unwrap();
        assert_eq!(ring.points().first(), ring.points().last());
        assert_eq!(ring.len(), 5);

        // already closed input is left as is
        let again = CoordinateRing::close(ring.clone().into_points()).unwrap();
        assert_eq!(again, ring);
    }

    #[test]
    fn test_too_short() {
        let pts = vec![GeoPoint::from_raw(0.0, 0.0), GeoPoint::from_raw(1.0, 1.0)];
        assert_eq!(CoordinateRing::close(pts), Err(RingError::TooShort(3)));
        assert_eq!(CoordinateRing::new(vec![]), Err(RingError::TooShort(0)));
    }

    #[test]
    fn test_contains() {
        let ring = CoordinateRing::close(square()).unwrap();
        assert!(ring.contains(&GeoPoint::from_raw(0.5, 0.5)));
        assert!(!ring.contains(&GeoPoint::from_raw(1.5, 0.5)));
        assert!(!ring.contains(&GeoPoint::from_raw(0.5, -0.2)));
    }

    #[test]
    fn test_polygon_axis_order() {
        let ring = CoordinateRing::close(vec![
            GeoPoint::from_raw(10.0, 20.0),
            GeoPoint::from_raw(11.0, 20.0),
            GeoPoint::from_raw(11.0, 21.0),
        ])
        .unwrap();
        let first = ring.to_polygon().exterior().0[0];
        assert_eq!(first.x, 20.0);
        assert_eq!(first.y, 10.0);
    }
}
