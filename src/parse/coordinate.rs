use regex::Regex;
use std::sync::LazyLock;

use crate::domain::{CoordinateError, GeoPoint};

/// "lat,lng" with the latitude shaped like ±90 and the longitude like ±180
///
/// Shape only: `90.5` fails because of the digits after `90`, not because
/// of a numeric comparison.
static LAT_LNG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^-?(?:90(?:\.0+)?|[1-8]?\d(?:\.\d+)?),\s*-?(?:180(?:\.0+)?|(?:1[0-7]\d|[1-9]?\d)(?:\.\d+)?)$",
    )
    .expect("coordinate pattern is a valid regex")
});

/// Parse a "lat,lng" literal, or return `None` for anything else
///
/// A `None` is the normal answer for place names and addresses; callers use
/// it to decide whether the text needs geocoding.
pub fn try_parse_lat_lng(input: &str) -> Option<GeoPoint> {
    let trimmed = input.trim();
    if !LAT_LNG_PATTERN.is_match(trimmed) {
        return None;
    }

    let (lat, lng) = trimmed.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;

    GeoPoint::new(lat, lng).ok()
}

/// True when the input looks like a "lat,lng" literal
pub fn is_lat_lng(input: &str) -> bool {
    try_parse_lat_lng(input).is_some()
}

/// Strict form of [`try_parse_lat_lng`] for arguments that must be coordinates
pub fn parse_lat_lng(input: &str) -> Result<GeoPoint, CoordinateError> {
    try_parse_lat_lng(input).ok_or_else(|| CoordinateError::NotALiteral(input.to_string()))
}
