pub mod geojson;

use serde::Deserialize;

/// How the CLI prints its results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One "lat,lng" per line
    #[default]
    Text,
    /// Plain JSON objects
    Json,
    /// GeoJSON features in [lng, lat] order
    #[value(name = "geojson")]
    GeoJson,
}
