//! Luma conversion.

use rayon::prelude::*;

use crate::codec::{RasterImage, BYTES_PER_PIXEL};

/// Weighted luma of one pixel, truncated (not rounded) to a byte.
///
/// The weights are applied in double precision in R, G, B order; the exact
/// truncation matters because outputs are compared byte for byte.
pub fn luma(b: u8, g: u8, r: u8) -> u8 {
    (f64::from(r) * 0.21 + f64::from(g) * 0.72 + f64::from(b) * 0.07) as u8
}

/// Replace every pixel with its luma in all three channels.
pub fn grayscale(image: &mut RasterImage) {
    let rows = image.rows();
    let pixels = image.columns() * BYTES_PER_PIXEL;
    let stride = image.stride();
    if rows == 0 || pixels == 0 {
        return;
    }

    image.data_mut()[..rows * stride]
        .par_chunks_mut(stride)
        .for_each(|row| {
            for px in row[..pixels].chunks_exact_mut(BYTES_PER_PIXEL) {
                let gray = luma(px[0], px[1], px[2]);
                px.fill(gray);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RasterHeader;

    #[test]
    fn test_luma_truncates() {
        // 30*0.21 + 20*0.72 + 10*0.07 = 21.4
        assert_eq!(luma(10, 20, 30), 21);
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 254);
        // the weighted sum lands just below the input level for some grays
        assert_eq!(luma(5, 5, 5), 4);
    }

    #[test]
    fn test_single_pixel_scenario() {
        let mut image = RasterImage::filled(1, 1, [10, 20, 30]);
        grayscale(&mut image);
        assert_eq!(image.data(), &[21, 21, 21, 0]);
    }

    #[test]
    fn test_padding_is_untouched() {
        let mut image = RasterImage::filled(1, 2, [10, 20, 30]);
        image.data_mut()[3] = 0xEE;
        image.data_mut()[7] = 0xEF;
        grayscale(&mut image);
        assert_eq!(image.data()[3], 0xEE);
        assert_eq!(image.data()[7], 0xEF);
        assert_eq!(image.pixel(0, 1), [21, 21, 21]);
    }

    #[test]
    fn test_second_pass_stays_gray_and_moves_at_most_one() {
        // one row holding every (b, g, r) = (v, 255 - v, v / 2)
        let mut data = Vec::new();
        for v in 0..=255u8 {
            data.extend_from_slice(&[v, 255 - v, v / 2]);
        }
        let header = RasterHeader::with_fields(256, 1, data.len() as i32);
        let mut once = RasterImage::new(256, 1, data, header);
        grayscale(&mut once);
        let mut twice = once.duplicate();
        grayscale(&mut twice);

        for x in 0..256 {
            let [b, g, r] = twice.pixel(x, 0);
            assert!(b == g && g == r);
            let first = once.pixel(x, 0)[0];
            assert!(first >= b && first - b <= 1, "pixel {x}: {first} -> {b}");
        }
    }

    #[test]
    fn test_fixed_point_on_stable_levels() {
        for level in [0u8, 1, 2, 3, 4, 21, 100, 128, 200, 254] {
            let mut once = RasterImage::filled(3, 3, [level, level, level]);
            grayscale(&mut once);
            let mut twice = once.duplicate();
            grayscale(&mut twice);
            assert_eq!(once, twice, "level {level}");
        }
    }
}
