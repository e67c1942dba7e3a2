//! Pixel kernels over a padded B,G,R raster.
//!
//! Every kernel indexes rows by the padded stride, never by `width * 3`, and
//! only touches rows that lie entirely inside the pixel buffer. Rows are
//! independent, so each kernel runs its rows in parallel with rayon.

pub mod blur;
pub mod flip;
pub mod grayscale;

pub use blur::blur;
pub use flip::{flip_horizontal, flip_vertical};
pub use grayscale::{grayscale, luma};
