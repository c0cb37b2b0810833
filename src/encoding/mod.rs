pub mod polyline;

pub use polyline::{DecodeError, EncodeError, decode, decode_with_precision, encode};
