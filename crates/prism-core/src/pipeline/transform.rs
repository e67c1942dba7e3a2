//! The six derived variants produced for every image.

use std::fmt;

use crate::codec::RasterImage;
use crate::kernels;

/// One output variant and the kernels it chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Grayscale
    Grayscale,
    /// Grayscale, then horizontal mirror
    GrayHMirror,
    /// Grayscale, then vertical mirror
    GrayVMirror,
    /// Horizontal mirror of the color image
    ColorHMirror,
    /// Vertical mirror of the color image
    ColorVMirror,
    /// Separable box blur
    Blur { kernel_size: u32 },
}

impl Transform {
    /// The full variant set, in output order.
    pub fn variants(kernel_size: u32) -> [Transform; 6] {
        [
            Transform::Grayscale,
            Transform::GrayHMirror,
            Transform::GrayVMirror,
            Transform::ColorHMirror,
            Transform::ColorVMirror,
            Transform::Blur { kernel_size },
        ]
    }

    /// Label embedded in the output file name.
    pub fn label(&self) -> String {
        match self {
            Transform::Grayscale => "gray".to_string(),
            Transform::GrayHMirror => "gray_hmirror".to_string(),
            Transform::GrayVMirror => "gray_vmirror".to_string(),
            Transform::ColorHMirror => "col_hmirror".to_string(),
            Transform::ColorVMirror => "col_vmirror".to_string(),
            Transform::Blur { kernel_size } => format!("blur_{kernel_size}"),
        }
    }

    /// Apply the variant to an image this call owns.
    pub fn apply(&self, mut image: RasterImage) -> RasterImage {
        match *self {
            Transform::Grayscale => kernels::grayscale(&mut image),
            Transform::GrayHMirror => {
                kernels::grayscale(&mut image);
                kernels::flip_horizontal(&mut image);
            }
            Transform::GrayVMirror => {
                kernels::grayscale(&mut image);
                kernels::flip_vertical(&mut image);
            }
            Transform::ColorHMirror => kernels::flip_horizontal(&mut image),
            Transform::ColorVMirror => kernels::flip_vertical(&mut image),
            Transform::Blur { kernel_size } => kernels::blur(&mut image, kernel_size),
        }
        image
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_labels() {
        let labels: Vec<String> = Transform::variants(55).iter().map(|t| t.label()).collect();
        assert_eq!(
            labels,
            [
                "gray",
                "gray_hmirror",
                "gray_vmirror",
                "col_hmirror",
                "col_vmirror",
                "blur_55"
            ]
        );
    }

    #[test]
    fn test_labels_are_unique() {
        let labels: HashSet<String> = Transform::variants(3).iter().map(|t| t.label()).collect();
        assert_eq!(labels.len(), 6);
    }

    #[test]
    fn test_single_pixel_scenario() {
        let source = RasterImage::filled(1, 1, [10, 20, 30]);
        let expected = [
            (Transform::Grayscale, [21u8, 21, 21]),
            (Transform::GrayHMirror, [21, 21, 21]),
            (Transform::GrayVMirror, [21, 21, 21]),
            (Transform::ColorHMirror, [10, 20, 30]),
            (Transform::ColorVMirror, [10, 20, 30]),
            (Transform::Blur { kernel_size: 1 }, [10, 20, 30]),
        ];
        for (transform, pixel) in expected {
            let out = transform.apply(source.duplicate());
            assert_eq!(out.data(), &[pixel[0], pixel[1], pixel[2], 0], "{transform}");
            assert_eq!(out.header(), source.header());
        }
    }

    #[test]
    fn test_gray_mirror_composes_kernels() {
        let mut source = RasterImage::filled(2, 1, [0, 0, 0]);
        source.data_mut()[..6].copy_from_slice(&[10, 20, 30, 0, 0, 255]);

        let out = Transform::GrayHMirror.apply(source.duplicate());
        // (255 * 0.21) truncated = 53 moves to the left
        assert_eq!(out.pixel(0, 0), [53, 53, 53]);
        assert_eq!(out.pixel(1, 0), [21, 21, 21]);
    }
}
