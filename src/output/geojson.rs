//! GeoJSON rendering for decoded routes, geofence rings and points
//!
//! Coordinates are written in [lng, lat] order as RFC 7946 requires.

use serde_json::{Map, Value, json};

use crate::domain::{CoordinateRing, GeoPoint};

pub fn point_feature(point: &GeoPoint, properties: Map<String, Value>) -> Value {
    feature(
        json!({ "type": "Point", "coordinates": point.lng_lat() }),
        properties,
    )
}

/// A decoded route as a LineString feature
pub fn line_string_feature(points: &[GeoPoint], properties: Map<String, Value>) -> Value {
    let coordinates: Vec<[f64; 2]> = points.iter().map(GeoPoint::lng_lat).collect();
    feature(
        json!({ "type": "LineString", "coordinates": coordinates }),
        properties,
    )
}

/// A geofence ring as a single-ring Polygon feature
pub fn polygon_feature(ring: &CoordinateRing, properties: Map<String, Value>) -> Value {
    let coordinates: Vec<[f64; 2]> = ring.points().iter().map(GeoPoint::lng_lat).collect();
    feature(
        json!({ "type": "Polygon", "coordinates": [coordinates] }),
        properties,
    )
}

pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({ "type": "FeatureCollection", "features": features })
}

fn feature(geometry: Value, properties: Map<String, Value>) -> Value {
    json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": properties,
    })
}
