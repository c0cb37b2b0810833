pub mod point;
pub mod ring;

pub use point::{CoordinateError, GeoPoint};
pub use ring::{CoordinateRing, RingError};
