use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, reload, util::SubscriberInitExt};

use ridegeo::api::{Location, resolve_location};
use ridegeo::config::{FileConfig, GeocoderConfig};
use ridegeo::domain::{CoordinateRing, GeoPoint};
use ridegeo::encoding::polyline::{MAX_PRECISION, decode_with_precision, encode_with_precision};
use ridegeo::geometry::{CircleBuilder, path_length_m, simplify_path};
use ridegeo::output::{OutputFormat, geojson};
use ridegeo::parse::{parse_lat_lng, try_parse_lat_lng};

/// Polyline, geofence and coordinate tools for rental map clients
///
/// Examples:
///   # Decode a directions polyline to GeoJSON
///   ridegeo -f geojson decode '_p~iF~ps|U_ulLnnqC_mqNvxq`@'
///
///   # Encode coordinates
///   ridegeo encode 38.5,-120.2 40.7,-120.95 43.252,-126.453
///
///   # 500 m geofence around a shop, geocoding the address
///   ridegeo circle "Hoan Kiem Lake, Hanoi" -r 500
///
///   # Is a bike inside the geofence?
///   ridegeo inside 21.0301,105.8520 --center 21.0285,105.8542 -r 300
#[derive(Parser, Debug)]
#[command(name = "ridegeo")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches ridegeo.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Output format: text, json or geojson
    #[arg(short = 'f', long, global = true)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode an encoded polyline into coordinates
    Decode {
        encoded: String,

        /// Polyline precision (5 = classic, 6 = polyline6)
        #[arg(long)]
        precision: Option<u32>,

        /// Simplify the decoded route with this tolerance in meters
        #[arg(long)]
        simplify: Option<f64>,
    },

    /// Encode "lat,lng" literals into a polyline
    Encode {
        #[arg(required = true, allow_hyphen_values = true)]
        points: Vec<String>,

        #[arg(long)]
        precision: Option<u32>,
    },

    /// Build a geofence circle around a coordinate or address
    Circle {
        #[arg(allow_hyphen_values = true)]
        location: String,

        /// Radius in meters
        #[arg(short = 'r', long)]
        radius: Option<f64>,

        /// Number of polygon vertices
        #[arg(long, value_parser = clap::value_parser!(u64).range(3..))]
        segments: Option<u64>,

        /// Print the ring as an encoded polyline instead of coordinates
        #[arg(long)]
        encoded: bool,
    },

    /// Tell whether text is a coordinate literal and resolve it
    Locate {
        #[arg(allow_hyphen_values = true)]
        text: String,
    },

    /// Check whether a point lies inside a geofence circle
    Inside {
        #[arg(allow_hyphen_values = true)]
        point: String,

        /// Geofence center: "lat,lng" or an address
        #[arg(long, allow_hyphen_values = true)]
        center: String,

        #[arg(short = 'r', long)]
        radius: Option<f64>,

        #[arg(long, value_parser = clap::value_parser!(u64).range(3..))]
        segments: Option<u64>,
    },
}

/// Flags merged over the config file
struct Settings {
    segments: usize,
    radius: f64,
    precision: u32,
    simplify: f64,
    format: OutputFormat,
    geocoder: GeocoderConfig,
}

impl Settings {
    fn from_config(config: &FileConfig, format: Option<OutputFormat>) -> Self {
        Self {
            segments: config.segments,
            radius: config.radius,
            precision: config.precision,
            simplify: config.simplify,
            format: format.or(config.format).unwrap_or_default(),
            geocoder: config.geocoder(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "ridegeo=debug" } else { "ridegeo=info" };
    let (filter, filter_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let file_config = match args.config {
        Some(ref path) => FileConfig::load_from(path)?,
        None => FileConfig::load().unwrap_or_default(),
    };

    if file_config.verbose && !args.verbose && std::env::var_os("RUST_LOG").is_none() {
        filter_handle
            .modify(|f| *f = EnvFilter::new("ridegeo=debug"))
            .context("Failed to raise log level")?;
    }

    let settings = Settings::from_config(&file_config, args.format);
    tracing::debug!(
        segments = settings.segments,
        radius = settings.radius,
        precision = settings.precision,
        format = ?settings.format,
        "settings"
    );

    match args.command {
        Command::Decode {
            encoded,
            precision,
            simplify,
        } => run_decode(
            &encoded,
            precision.unwrap_or(settings.precision),
            simplify.unwrap_or(settings.simplify),
            settings.format,
        ),
        Command::Encode { points, precision } => {
            run_encode(&points, precision.unwrap_or(settings.precision), settings.format)
        }
        Command::Circle {
            location,
            radius,
            segments,
            encoded,
        } => {
            let builder = circle_builder(segments, &settings);
            run_circle(
                &location,
                radius.unwrap_or(settings.radius),
                builder,
                encoded,
                &settings,
            )
        }
        Command::Locate { text } => run_locate(&text, &settings),
        Command::Inside {
            point,
            center,
            radius,
            segments,
        } => {
            let builder = circle_builder(segments, &settings);
            run_inside(
                &point,
                &center,
                radius.unwrap_or(settings.radius),
                builder,
                &settings,
            )
        }
    }
}

fn circle_builder(segments: Option<u64>, settings: &Settings) -> CircleBuilder {
    let segments = segments.map(|s| s as usize).unwrap_or(settings.segments);
    CircleBuilder::default().with_segments(segments)
}

fn run_decode(encoded: &str, precision: u32, simplify: f64, format: OutputFormat) -> Result<()> {
    check_precision(precision)?;
    let decoded =
        decode_with_precision(encoded.trim(), precision).context("Failed to decode polyline")?;
    let decoded_len = decoded.len();

    let points = if simplify > 0.0 {
        let simplified = simplify_path(&decoded, simplify);
        tracing::info!(
            "simplified {} points to {} ({}m tolerance)",
            decoded_len,
            simplified.len(),
            simplify
        );
        simplified
    } else {
        decoded
    };
    let length_m = path_length_m(&points);

    match format {
        OutputFormat::Text => {
            let digits = precision as usize;
            for p in &points {
                println!("{:.digits$},{:.digits$}", p.latitude(), p.longitude());
            }
        }
        OutputFormat::Json => print_json(&json!({
            "points": points,
            "length_m": length_m,
        }))?,
        OutputFormat::GeoJson => {
            let mut props = Map::new();
            props.insert("points".into(), json!(points.len()));
            props.insert("length_m".into(), json!(length_m));
            print_json(&geojson::line_string_feature(&points, props))?;
        }
    }

    Ok(())
}

fn run_encode(literals: &[String], precision: u32, format: OutputFormat) -> Result<()> {
    check_precision(precision)?;
    let points = literals
        .iter()
        .map(|s| parse_lat_lng(s))
        .collect::<Result<Vec<GeoPoint>, _>>()?;

    let encoded = encode_with_precision(&points, precision).context("Failed to encode points")?;

    match format {
        OutputFormat::Text => println!("{}", encoded),
        OutputFormat::Json => print_json(&json!({
            "encoded": encoded,
            "precision": precision,
            "points": points.len(),
        }))?,
        OutputFormat::GeoJson => {
            let mut props = Map::new();
            props.insert("encoded".into(), json!(encoded));
            props.insert("precision".into(), json!(precision));
            print_json(&geojson::line_string_feature(&points, props))?;
        }
    }

    Ok(())
}

fn run_circle(
    location: &str,
    radius: f64,
    builder: CircleBuilder,
    encoded: bool,
    settings: &Settings,
) -> Result<()> {
    let center = resolve_with_spinner(location, &settings.geocoder)?;
    let ring = builder
        .build(center.point(), radius)
        .context("Failed to build geofence circle")?;

    if encoded {
        let polyline = encode_with_precision(ring.points(), settings.precision)
            .context("Failed to encode geofence ring")?;
        match encoded_ring_output(&polyline, &ring, &center, radius, settings) {
            Some(value) => print_json(&value)?,
            None => println!("{}", polyline),
        }
        return Ok(());
    }

    match settings.format {
        OutputFormat::Text => {
            for p in ring.points() {
                println!("{:.6},{:.6}", p.latitude(), p.longitude());
            }
        }
        OutputFormat::Json => print_json(&json!({
            "center": center,
            "radius_m": radius,
            "segments": builder.segments(),
            "ring": ring.points(),
        }))?,
        OutputFormat::GeoJson => print_json(&geofence_collection(&ring, &center, radius, None))?,
    }

    Ok(())
}

/// JSON or GeoJSON wrapper for an encoded geofence ring; `None` for text output
fn encoded_ring_output(
    polyline: &str,
    ring: &CoordinateRing,
    center: &Location,
    radius: f64,
    settings: &Settings,
) -> Option<Value> {
    match settings.format {
        OutputFormat::Text => None,
        OutputFormat::Json => Some(json!({
            "encoded": polyline,
            "precision": settings.precision,
            "center": center,
            "radius_m": radius,
            "points": ring.len(),
        })),
        OutputFormat::GeoJson => {
            let mut props = Map::new();
            props.insert("radius_m".into(), json!(radius));
            props.insert("encoded".into(), json!(polyline));
            props.insert("precision".into(), json!(settings.precision));
            Some(geojson::polygon_feature(ring, props))
        }
    }
}

fn run_locate(text: &str, settings: &Settings) -> Result<()> {
    let location = resolve_with_spinner(text, &settings.geocoder)?;
    let point = location.point();

    match settings.format {
        OutputFormat::Text => match &location {
            Location::Literal { .. } => {
                println!("literal {:.6},{:.6}", point.latitude(), point.longitude())
            }
            Location::Geocoded(place) => println!(
                "geocoded {:.6},{:.6} {}",
                point.latitude(),
                point.longitude(),
                place.display_name
            ),
        },
        OutputFormat::Json => print_json(&serde_json::to_value(&location)?)?,
        OutputFormat::GeoJson => {
            print_json(&geojson::point_feature(&point, location_properties(&location)))?
        }
    }

    Ok(())
}

fn run_inside(
    point: &str,
    center: &str,
    radius: f64,
    builder: CircleBuilder,
    settings: &Settings,
) -> Result<()> {
    let point = parse_lat_lng(point)?;
    let center = resolve_with_spinner(center, &settings.geocoder)?;
    let ring = builder
        .build(center.point(), radius)
        .context("Failed to build geofence circle")?;

    let inside = ring.contains(&point);
    let distance_m = point.distance_to(&center.point());
    tracing::debug!(inside, distance_m, radius, "geofence check");

    match settings.format {
        OutputFormat::Text => println!(
            "{} ({:.1}m from center, radius {}m)",
            if inside { "inside" } else { "outside" },
            distance_m,
            radius
        ),
        OutputFormat::Json => print_json(&json!({
            "inside": inside,
            "distance_m": distance_m,
            "radius_m": radius,
            "center": center,
        }))?,
        OutputFormat::GeoJson => {
            print_json(&geofence_collection(&ring, &center, radius, Some((point, inside))))?
        }
    }

    Ok(())
}

fn geofence_collection(
    ring: &CoordinateRing,
    center: &Location,
    radius: f64,
    probe: Option<(GeoPoint, bool)>,
) -> Value {
    let mut ring_props = Map::new();
    ring_props.insert("radius_m".into(), json!(radius));

    let mut features = vec![
        geojson::polygon_feature(ring, ring_props),
        geojson::point_feature(&center.point(), location_properties(center)),
    ];

    if let Some((point, inside)) = probe {
        let mut props = Map::new();
        props.insert("inside".into(), json!(inside));
        features.push(geojson::point_feature(&point, props));
    }

    geojson::feature_collection(features)
}

fn location_properties(location: &Location) -> Map<String, Value> {
    let mut props = Map::new();
    match location {
        Location::Literal { .. } => {
            props.insert("source".into(), json!("literal"));
        }
        Location::Geocoded(place) => {
            props.insert("source".into(), json!("geocoded"));
            props.insert("display_name".into(), json!(place.display_name));
        }
    }
    props
}

/// Resolve a location, showing a spinner only when the geocoder is hit
fn resolve_with_spinner(input: &str, geocoder: &GeocoderConfig) -> Result<Location> {
    if try_parse_lat_lng(input).is_some() {
        return resolve_location(input, geocoder);
    }

    let spinner = create_spinner(&format!("Geocoding {:?}...", input.trim()));
    let start = Instant::now();
    let location = resolve_location(input, geocoder);

    match &location {
        Ok(loc) => {
            let p = loc.point();
            spinner.finish_with_message(format!(
                "Geocoded -> ({:.4}, {:.4}) [{:.1}s]",
                p.latitude(),
                p.longitude(),
                start.elapsed().as_secs_f32()
            ));
        }
        Err(_) => spinner.finish_and_clear(),
    }

    location.context("Failed to resolve location")
}

fn check_precision(precision: u32) -> Result<()> {
    if precision > MAX_PRECISION {
        bail!("--precision must be between 0 and {}", MAX_PRECISION);
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
