//! The fixed-header raster container and its in-memory representation.

pub mod container;
pub mod raster;

pub use container::{decode, decode_from, encode, encode_to};
pub use raster::{stride, RasterHeader, RasterImage, BYTES_PER_PIXEL, HEADER_LEN};
