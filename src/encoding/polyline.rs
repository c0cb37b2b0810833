//! Encoded polyline codec
//!
//! Implements the polyline format used by Google, Goong, Mapbox and OSRM
//! directions APIs: each coordinate component is stored as a zig-zag
//! encoded delta from the previous point, split into 5-bit chunks (least
//! significant first), each chunk offset by 63 into printable ASCII with
//! bit 0x20 flagging that another chunk follows.
//!
//! Components alternate latitude then longitude, scaled by 10^precision
//! (precision 5 for the classic format, 6 for `polyline6`).

use thiserror::Error;

use crate::domain::GeoPoint;

/// Precision of the classic polyline format (1e-5 degrees)
pub const DEFAULT_PRECISION: u32 = 5;

/// Largest supported precision; 180 * 10^10 still fits an i64 comfortably
pub const MAX_PRECISION: u32 = 10;

const CHUNK_OFFSET: u8 = 63;
const MAX_CHUNK_BYTE: u8 = CHUNK_OFFSET + 63;
const CONTINUATION_BIT: u64 = 0x20;
const CHUNK_MASK: u64 = 0x1f;
const CHUNK_BITS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("polyline ended in the middle of the value starting at byte {position}")]
    Truncated { position: usize },
    #[error("byte {byte:#04x} at position {position} is not a polyline character")]
    InvalidCharacter { position: usize, byte: u8 },
    #[error("value starting at byte {position} does not fit in 64 bits")]
    Overflow { position: usize },
    #[error("precision {0} is outside 0..={MAX_PRECISION}")]
    InvalidPrecision(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("point {index} has a non-finite or out of range component")]
    InvalidPoint { index: usize },
    #[error("precision {0} is outside 0..={MAX_PRECISION}")]
    InvalidPrecision(u32),
}

/// Decode a precision-5 polyline into points, in encoding order
///
/// An empty string decodes to an empty vector. Input that stops in the
/// middle of a value (including a latitude with no longitude after it)
/// fails with [`DecodeError::Truncated`]. Decoded coordinates are not
/// range checked.
pub fn decode(encoded: &str) -> Result<Vec<GeoPoint>, DecodeError> {
    decode_with_precision(encoded, DEFAULT_PRECISION)
}

/// Decode a polyline encoded with `precision` decimal digits
pub fn decode_with_precision(encoded: &str, precision: u32) -> Result<Vec<GeoPoint>, DecodeError> {
    let factor = scale_factor(precision).ok_or(DecodeError::InvalidPrecision(precision))?;
    let bytes = encoded.as_bytes();

    let mut points = Vec::with_capacity(bytes.len() / 4);
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        let lat_start = index;
        let d_lat = decode_value(bytes, &mut index)?;
        let lng_start = index;
        let d_lng = decode_value(bytes, &mut index)?;

        lat = lat
            .checked_add(d_lat)
            .ok_or(DecodeError::Overflow { position: lat_start })?;
        lng = lng
            .checked_add(d_lng)
            .ok_or(DecodeError::Overflow { position: lng_start })?;

        points.push(GeoPoint::from_raw(lat as f64 / factor, lng as f64 / factor));
    }

    Ok(points)
}

/// Read one zig-zag value starting at `*index`, advancing past it
fn decode_value(bytes: &[u8], index: &mut usize) -> Result<i64, DecodeError> {
    let start = *index;
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(DecodeError::Truncated { position: start });
        };
        if !(CHUNK_OFFSET..=MAX_CHUNK_BYTE).contains(&byte) {
            return Err(DecodeError::InvalidCharacter {
                position: *index,
                byte,
            });
        }
        if shift >= u64::BITS {
            return Err(DecodeError::Overflow { position: start });
        }

        let chunk = u64::from(byte - CHUNK_OFFSET);
        let bits = chunk & CHUNK_MASK;
        // the 13th chunk only has room for 4 bits
        if shift > 0 && bits >> (u64::BITS - shift) != 0 {
            return Err(DecodeError::Overflow { position: start });
        }
        result |= bits << shift;
        *index += 1;

        if chunk & CONTINUATION_BIT == 0 {
            break;
        }
        shift += CHUNK_BITS;
    }

    let magnitude = (result >> 1) as i64;
    Ok(if result & 1 == 1 { !magnitude } else { magnitude })
}

/// Encode points as a precision-5 polyline
pub fn encode(points: &[GeoPoint]) -> Result<String, EncodeError> {
    encode_with_precision(points, DEFAULT_PRECISION)
}

/// Encode points, rounding each component to `precision` decimal digits
pub fn encode_with_precision(points: &[GeoPoint], precision: u32) -> Result<String, EncodeError> {
    let factor = scale_factor(precision).ok_or(EncodeError::InvalidPrecision(precision))?;

    let mut out = String::with_capacity(points.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for (index, point) in points.iter().enumerate() {
        let lat = to_fixed(point.latitude(), factor).ok_or(EncodeError::InvalidPoint { index })?;
        let lng = to_fixed(point.longitude(), factor).ok_or(EncodeError::InvalidPoint { index })?;

        encode_value(lat - prev_lat, &mut out);
        encode_value(lng - prev_lng, &mut out);

        prev_lat = lat;
        prev_lng = lng;
    }

    Ok(out)
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = ((value << 1) ^ (value >> 63)) as u64;

    while v >= CONTINUATION_BIT {
        let chunk = (CONTINUATION_BIT | (v & CHUNK_MASK)) as u8;
        out.push(char::from(chunk + CHUNK_OFFSET));
        v >>= CHUNK_BITS;
    }
    out.push(char::from(v as u8 + CHUNK_OFFSET));
}

/// Round a degree value to fixed point; rejects anything past ±360 degrees
fn to_fixed(degrees: f64, factor: f64) -> Option<i64> {
    if !degrees.is_finite() || degrees.abs() > 360.0 {
        return None;
    }
    Some((degrees * factor).round() as i64)
}

fn scale_factor(precision: u32) -> Option<f64> {
    (precision <= MAX_PRECISION).then(|| 10f64.powi(precision as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn assert_close(points: &[GeoPoint], expected: &[(f64, f64)]) {
        assert_eq!(points.len(), expected.len());
        for (p, &(lat, lng)) in points.iter().zip(expected) {
            assert!((p.latitude() - lat).abs() < 1e-5, "lat {} vs {}", p.latitude(), lat);
            assert!((p.longitude() - lng).abs() < 1e-5, "lng {} vs {}", p.longitude(), lng);
        }
    }

    #[test]
    fn test_decode_reference_vector() {
        let points = decode(REFERENCE).unwrap();
        assert_close(
            &points,
            &[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)],
        );
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode("").unwrap(), vec![]);
    }

    #[test]
    fn test_decode_missing_longitude() {
        // "_p~iF" is a complete latitude with nothing after it
        assert_eq!(
            decode("_p~iF"),
            Err(DecodeError::Truncated { position: 5 })
        );
    }

    #[test]
    fn test_decode_truncated_mid_chunk() {
        // 'i' still has the continuation bit set
        assert_eq!(decode("_p~i"), Err(DecodeError::Truncated { position: 0 }));
        assert!(matches!(
            decode(&REFERENCE[..REFERENCE.len() - 1]),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decode_all_continuation() {
        // Every byte keeps the continuation bit set until the end
        assert!(matches!(decode("~~~"), Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_decode_overflow_is_reported() {
        let long_run = "~".repeat(20) + "?";
        assert_eq!(
            decode(&long_run),
            Err(DecodeError::Overflow { position: 0 })
        );
    }

    #[test]
    fn test_decode_thirteenth_chunk_overflow() {
        // 12 full chunks carry 60 bits; 'O' sets bit 4 of the last chunk, bit 64 overall
        let encoded = "~".repeat(12) + "O" + "?";
        assert_eq!(decode(&encoded), Err(DecodeError::Overflow { position: 0 }));
    }

    #[test]
    fn test_decode_widest_values() {
        for value in [i64::MIN, i64::MAX] {
            let mut encoded = String::new();
            encode_value(value, &mut encoded);
            assert_eq!(encoded.len(), 13);

            let mut index = 0;
            assert_eq!(decode_value(encoded.as_bytes(), &mut index), Ok(value));
            assert_eq!(index, 13);

            encode_value(0, &mut encoded);
            let points = decode(&encoded).unwrap();
            assert_eq!(points.len(), 1);
            assert_eq!(points[0].latitude(), value as f64 / 1e5);
            assert_eq!(points[0].longitude(), 0.0);
        }
    }

    #[test]
    fn test_decode_invalid_character() {
        assert_eq!(
            decode("_p~iF ps|U"),
            Err(DecodeError::InvalidCharacter {
                position: 5,
                byte: b' '
            })
        );
        assert!(matches!(
            decode("_p~iF~ps|Ué"),
            Err(DecodeError::InvalidCharacter { position: 10, .. })
        ));
    }

    #[test]
    fn test_decode_out_of_range_values_are_kept() {
        // 200 degrees of latitude, 0 longitude
        let encoded = encode_with_precision(&[GeoPoint::from_raw(200.0, 0.0)], 5).unwrap();
        let points = decode(&encoded).unwrap();
        assert_eq!(points, vec![GeoPoint::from_raw(200.0, 0.0)]);
    }

    #[test]
    fn test_decode_precision_six() {
        let pts = vec![
            GeoPoint::from_raw(21.028511, 105.804817),
            GeoPoint::from_raw(21.030102, 105.852341),
        ];
        let encoded = encode_with_precision(&pts, 6).unwrap();
        let decoded = decode_with_precision(&encoded, 6).unwrap();
        assert_eq!(decoded, pts);

        // the same string read at precision 5 is ten times larger
        let wrong = decode(&encoded).unwrap();
        assert!((wrong[0].latitude() - 210.28511).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_precision() {
        assert_eq!(
            decode_with_precision(REFERENCE, 11),
            Err(DecodeError::InvalidPrecision(11))
        );
        assert_eq!(
            encode_with_precision(&[], 42),
            Err(EncodeError::InvalidPrecision(42))
        );
    }

    #[test]
    fn test_encode_reference_vector() {
        let pts = [
            GeoPoint::from_raw(38.5, -120.2),
            GeoPoint::from_raw(40.7, -120.95),
            GeoPoint::from_raw(43.252, -126.453),
        ];
        assert_eq!(encode(&pts).unwrap(), REFERENCE);
    }

    #[test]
    fn test_encode_rejects_non_finite() {
        let pts = [
            GeoPoint::from_raw(1.0, 1.0),
            GeoPoint::from_raw(f64::NAN, 1.0),
        ];
        assert_eq!(encode(&pts), Err(EncodeError::InvalidPoint { index: 1 }));
    }

    proptest! {
        #[test]
        fn test_round_trip_at_five_decimals(
            raw in prop::collection::vec((-9_000_000i64..=9_000_000, -18_000_000i64..=18_000_000), 0..64)
        ) {
            let points: Vec<GeoPoint> = raw
                .iter()
                .map(|&(lat, lng)| GeoPoint::from_raw(lat as f64 / 1e5, lng as f64 / 1e5))
                .collect();

            let encoded = encode(&points).unwrap();
            prop_assert_eq!(decode(&encoded).unwrap(), points);
        }

        #[test]
        fn test_decode_never_panics(input in "\\PC{0,40}") {
            let _ = decode(&input);
        }
    }
}
