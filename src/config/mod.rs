use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::encoding::polyline::DEFAULT_PRECISION;
use crate::geometry::DEFAULT_SEGMENTS;
use crate::output::OutputFormat;

fn default_segments() -> usize {
    DEFAULT_SEGMENTS
}
fn default_radius() -> f64 {
    500.0
}
fn default_precision() -> u32 {
    DEFAULT_PRECISION
}
fn default_simplify() -> f64 {
    0.0
}
fn default_verbose() -> bool {
    false
}

#[derive(Debug, Deserialize)]
pub struct FileConfig {
    /// Geofence circle vertex count
    #[serde(default = "default_segments")]
    pub segments: usize,
    /// Geofence radius in meters
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Polyline precision (5 for classic, 6 for polyline6)
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Route simplification tolerance in meters, 0 = off
    #[serde(default = "default_simplify")]
    pub simplify: f64,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub geocoder: Option<GeocoderConfig>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            segments: default_segments(),
            radius: default_radius(),
            precision: default_precision(),
            simplify: default_simplify(),
            verbose: default_verbose(),
            format: None,
            geocoder: None,
        }
    }
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_user_agent() -> String {
    concat!("ridegeo/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Nominatim endpoint settings
#[derive(Debug, Deserialize, Clone)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_url")]
    pub url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Comma separated ISO 3166-1 alpha-2 codes to bias results, e.g. "vn"
    #[serde(default)]
    pub country_codes: Option<String>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: default_geocoder_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            country_codes: None,
        }
    }
}

impl FileConfig {
    /// Load the first config file found in the search path
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => {
                        tracing::debug!("loaded config from {}", path.display());
                        return Some(config);
                    }
                    Err(e) => {
                        tracing::warn!("failed to parse config file {}: {}", path.display(), e);
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly requested config file; missing or invalid is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn geocoder(&self) -> GeocoderConfig {
        self.geocoder.clone().unwrap_or_default()
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("ridegeo.toml"));
    paths.push(PathBuf::from(".ridegeo.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("ridegeo").join("config.toml"));
        paths.push(config_dir.join("ridegeo.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".ridegeo.toml"));
        paths.push(home.join(".config").join("ridegeo").join("config.toml"));
    }

    paths
}
