pub mod circle;
pub mod distance;
pub mod simplify;

pub use circle::{CircleBuilder, DEFAULT_SEGMENTS, GeometryError, build_circle};
pub use distance::{haversine_m, path_length_m};
pub use simplify::simplify_path;
