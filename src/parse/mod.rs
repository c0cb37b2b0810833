pub mod coordinate;

pub use coordinate::{is_lat_lng, parse_lat_lng, try_parse_lat_lng};
