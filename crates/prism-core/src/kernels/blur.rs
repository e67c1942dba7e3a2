//! Separable box blur with a clipped-average edge policy.
//!
//! Each output value is the integer mean of the in-bounds taps only, so
//! border pixels average over fewer samples instead of mixing in zeros.

use rayon::prelude::*;

use crate::codec::{RasterImage, BYTES_PER_PIXEL};

/// Blur with a `kernel_size`-wide box (radius `kernel_size / 2`).
///
/// The horizontal pass writes into a fresh buffer; the vertical pass reads
/// only that buffer and writes into another, which then replaces the image
/// data. Bytes outside the pixel area (row padding, trailing bytes) are
/// carried over unchanged.
pub fn blur(image: &mut RasterImage, kernel_size: u32) {
    let radius = (kernel_size / 2) as usize;
    let rows = image.rows();
    let columns = image.columns();
    let stride = image.stride();
    if rows == 0 || columns == 0 {
        return;
    }

    let horizontal = horizontal_pass(image.data(), rows, columns, stride, radius);
    let output = vertical_pass(&horizontal, rows, columns, stride, radius);
    image.replace_data(output);
}

fn horizontal_pass(
    src: &[u8],
    rows: usize,
    columns: usize,
    stride: usize,
    radius: usize,
) -> Vec<u8> {
    let mut dst = src.to_vec();

    dst[..rows * stride]
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, out)| {
            let row = &src[y * stride..(y + 1) * stride];
            let tap = |x: usize, c: usize| u32::from(row[x * BYTES_PER_PIXEL + c]);

            // running window [lo, hi] for x = 0
            let mut lo = 0;
            let mut hi = radius.min(columns - 1);
            let mut sum = [0u32; BYTES_PER_PIXEL];
            for nx in lo..=hi {
                for (c, s) in sum.iter_mut().enumerate() {
                    *s += tap(nx, c);
                }
            }

            for x in 0..columns {
                let count = (hi - lo + 1) as u32;
                for (c, s) in sum.iter().enumerate() {
                    out[x * BYTES_PER_PIXEL + c] = (s / count) as u8;
                }

                if x + radius + 1 < columns {
                    hi += 1;
                    for (c, s) in sum.iter_mut().enumerate() {
                        *s += tap(hi, c);
                    }
                }
                if x >= radius {
                    for (c, s) in sum.iter_mut().enumerate() {
                        *s -= tap(lo, c);
                    }
                    lo += 1;
                }
            }
        });

    dst
}

fn vertical_pass(
    src: &[u8],
    rows: usize,
    columns: usize,
    stride: usize,
    radius: usize,
) -> Vec<u8> {
    let pixels = columns * BYTES_PER_PIXEL;
    let mut dst = src.to_vec();

    dst[..rows * stride]
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, out)| {
            let lo = y.saturating_sub(radius);
            let hi = (y + radius).min(rows - 1);
            let count = (hi - lo + 1) as u32;

            let mut sum = vec![0u32; pixels];
            for ny in lo..=hi {
                let row = &src[ny * stride..ny * stride + pixels];
                for (s, &v) in sum.iter_mut().zip(row) {
                    *s += u32::from(v);
                }
            }
            for (o, s) in out[..pixels].iter_mut().zip(&sum) {
                *o = (s / count) as u8;
            }
        });

    dst
}
