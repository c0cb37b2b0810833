//! ridegeo - polyline decoding, geofence circles and lat/lng parsing for rental map clients

pub mod api;
pub mod config;
pub mod domain;
pub mod encoding;
pub mod geometry;
pub mod output;
pub mod parse;

pub use domain::{CoordinateRing, GeoPoint};
pub use encoding::{DecodeError, decode};
pub use geometry::{GeometryError, build_circle};
pub use parse::try_parse_lat_lng;
