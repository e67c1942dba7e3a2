//! Mirror kernels.

use rayon::prelude::*;

use crate::codec::{RasterImage, BYTES_PER_PIXEL};

/// Mirror columns within each row: pixel `x` swaps with `width - 1 - x`.
pub fn flip_horizontal(image: &mut RasterImage) {
    let rows = image.rows();
    let columns = image.columns();
    let stride = image.stride();
    if rows == 0 || columns < 2 {
        return;
    }

    image.data_mut()[..rows * stride]
        .par_chunks_mut(stride)
        .for_each(|row| {
            for x in 0..columns / 2 {
                let left = x * BYTES_PER_PIXEL;
                let right = (columns - 1 - x) * BYTES_PER_PIXEL;
                for c in 0..BYTES_PER_PIXEL {
                    row.swap(left + c, right + c);
                }
            }
        });
}

/// Mirror rows: row `y` swaps with row `height - 1 - y`, padding included.
pub fn flip_vertical(image: &mut RasterImage) {
    let rows = image.rows();
    let stride = image.stride();
    if rows < 2 {
        return;
    }

    let (top, bottom) = image.data_mut()[..rows * stride].split_at_mut(rows / 2 * stride);
    // With an odd row count the middle row is the first chunk of `bottom`
    // and is never reached by the reversed zip.
    top.par_chunks_mut(stride)
        .zip(bottom.par_chunks_mut(stride).rev())
        .for_each(|(upper, lower)| upper.swap_with_slice(lower));
}
