use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

use crate::config::GeocoderConfig;
use crate::domain::GeoPoint;

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

/// A place returned by the geocoder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodedPlace {
    pub point: GeoPoint,
    pub display_name: String,
}

/// Geocode a free-text address or place name.
///
/// Uses the Nominatim search API with `limit=1`. Includes a 1 second delay
/// for rate limiting (Nominatim ToS).
///
/// # Returns
/// * `Ok(GeocodedPlace)` - best match
/// * `Err` - if nothing matched or the API failed
pub fn geocode(query: &str, config: &GeocoderConfig) -> Result<GeocodedPlace> {
    // Rate limiting - Nominatim requires max 1 request per second
    thread::sleep(Duration::from_secs(1));

    let client = reqwest::blocking::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;

    let mut params: Vec<(&str, &str)> = vec![("q", query), ("format", "json"), ("limit", "1")];
    if let Some(codes) = config.country_codes.as_deref() {
        params.push(("countrycodes", codes));
    }

    tracing::debug!(url = %config.url, query, "geocoding");

    let response = client
        .get(&config.url)
        .query(&params)
        .send()
        .context("Failed to send request to Nominatim API")?;

    if !response.status().is_success() {
        bail!("Nominatim API returned error status: {}", response.status());
    }

    let results: Vec<NominatimResult> = response
        .json()
        .context("Failed to parse Nominatim JSON response")?;

    first_place(results).with_context(|| format!("No geocoding result for {:?}", query))
}

fn first_place(results: Vec<NominatimResult>) -> Result<GeocodedPlace> {
    let result = results
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("empty result list"))?;

    let lat: f64 = result
        .lat
        .parse()
        .context("Failed to parse latitude from Nominatim response")?;
    let lon: f64 = result
        .lon
        .parse()
        .context("Failed to parse longitude from Nominatim response")?;
    let point = GeoPoint::new(lat, lon).context("Nominatim returned an invalid coordinate")?;

    Ok(GeocodedPlace {
        point,
        display_name: result.display_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nominatim_response() {
        let json = r#"[{"lat":"21.0341","lon":"105.8510","display_name":"Phố cổ Hà Nội, Hoàn Kiếm, Hà Nội, Việt Nam"}]"#;
        let results: Vec<NominatimResult> = serde_json::from_str(json).unwrap();

        let place = first_place(results).unwrap();
        assert_eq!(place.point.lat_lng(), (21.0341, 105.851));
        assert!(place.display_name.starts_with("Phố cổ"));
    }

    #[test]
    fn test_empty_response() {
        let results: Vec<NominatimResult> = serde_json::from_str("[]").unwrap();
        assert!(first_place(results).is_err());
    }

    #[test]
    fn test_bad_coordinate() {
        let json = r#"[{"lat":"abc","lon":"105.8","display_name":"x"}]"#;
        let results: Vec<NominatimResult> = serde_json::from_str(json).unwrap();
        assert!(first_place(results).is_err());

        let json = r#"[{"lat":"95.0","lon":"105.8","display_name":"x"}]"#;
        let results: Vec<NominatimResult> = serde_json::from_str(json).unwrap();
        assert!(first_place(results).is_err());
    }
}
