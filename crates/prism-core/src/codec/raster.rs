//! In-memory raster: opaque header plus a padded B,G,R pixel buffer.

/// Length of the fixed container header.
pub const HEADER_LEN: usize = 54;

/// Bytes per pixel (B, G, R).
pub const BYTES_PER_PIXEL: usize = 3;

const WIDTH_OFFSET: usize = 18;
const HEIGHT_OFFSET: usize = 22;
const DATA_SIZE_OFFSET: usize = 34;

/// Padded row length in bytes for a row of `width` pixels.
///
/// Rows are padded up to a 4-byte boundary. Non-positive widths have no row.
pub fn stride(width: i32) -> usize {
    if width <= 0 {
        return 0;
    }
    (width as usize * BYTES_PER_PIXEL + 3) & !3
}

/// Buffer length as stored in the header's i32 size field, saturating at
/// `i32::MAX`.
fn size_field(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// The 54-byte container header, kept verbatim and replayed on every output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterHeader([u8; HEADER_LEN]);

impl Default for RasterHeader {
    fn default() -> Self {
        Self([0; HEADER_LEN])
    }
}

impl RasterHeader {
    /// Wrap raw header bytes.
    pub fn from_bytes(bytes: [u8; HEADER_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a header carrying only the three fields the pipeline reads.
    ///
    /// Every other byte is zero.
    pub fn with_fields(width: i32, height: i32, data_size: i32) -> Self {
        let mut header = Self::default();
        header.put(WIDTH_OFFSET, width);
        header.put(HEIGHT_OFFSET, height);
        header.put(DATA_SIZE_OFFSET, data_size);
        header
    }

    /// Raw header bytes.
    pub fn as_bytes(&self) -> &[u8; HEADER_LEN] {
        &self.0
    }

    /// Width in pixels (little-endian i32 at offset 18).
    pub fn width(&self) -> i32 {
        self.get(WIDTH_OFFSET)
    }

    /// Height in pixels (little-endian i32 at offset 22).
    pub fn height(&self) -> i32 {
        self.get(HEIGHT_OFFSET)
    }

    /// Declared pixel-data size in bytes (little-endian i32 at offset 34).
    pub fn data_size(&self) -> i32 {
        self.get(DATA_SIZE_OFFSET)
    }

    fn get(&self, offset: usize) -> i32 {
        let mut field = [0u8; 4];
        field.copy_from_slice(&self.0[offset..offset + 4]);
        i32::from_le_bytes(field)
    }

    fn put(&mut self, offset: usize, value: i32) {
        self.0[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }
}

/// A decoded image owned by exactly one pipeline stage.
///
/// `Clone` deep-copies the pixel buffer, so duplicates never alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: i32,
    height: i32,
    data: Vec<u8>,
    header: RasterHeader,
}

impl RasterImage {
    /// Assemble an image from already-decoded parts.
    ///
    /// No consistency check is made between the dimensions and the buffer;
    /// kernels limit themselves to the rows the buffer actually holds.
    pub fn new(width: i32, height: i32, data: Vec<u8>, header: RasterHeader) -> Self {
        Self {
            width,
            height,
            data,
            header,
        }
    }

    /// A `width` x `height` image filled with one B,G,R color.
    ///
    /// The header carries the matching width, height and size fields.
    pub fn filled(width: i32, height: i32, bgr: [u8; 3]) -> Self {
        let row = stride(width);
        let rows = height.max(0) as usize;
        let mut data = vec![0u8; row * rows];
        for y in 0..rows {
            for x in 0..width.max(0) as usize {
                let idx = y * row + x * BYTES_PER_PIXEL;
                data[idx..idx + BYTES_PER_PIXEL].copy_from_slice(&bgr);
            }
        }
        let header = RasterHeader::with_fields(width, height, size_field(data.len()));
        Self::new(width, height, data, header)
    }

    /// Independent deep copy for a transform task.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Pixel-buffer size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Padded row length for this image's width.
    pub fn stride(&self) -> usize {
        stride(self.width)
    }

    /// Header captured at decode time.
    pub fn header(&self) -> &RasterHeader {
        &self.header
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Replace the pixel buffer (used by kernels that compute into scratch).
    pub(crate) fn replace_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    /// Width as a pixel count, zero when the header declares a negative value.
    pub fn columns(&self) -> usize {
        self.width.max(0) as usize
    }

    /// Number of rows that lie entirely inside the pixel buffer.
    pub fn rows(&self) -> usize {
        let stride = self.stride();
        if stride == 0 {
            return 0;
        }
        (self.height.max(0) as usize).min(self.data.len() / stride)
    }

    /// The B,G,R triple at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = y * self.stride() + x * BYTES_PER_PIXEL;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_padding() {
        assert_eq!(stride(1), 4);
        assert_eq!(stride(2), 8);
        assert_eq!(stride(3), 12);
        assert_eq!(stride(4), 12);
        assert_eq!(stride(5), 16);
        assert_eq!(stride(0), 0);
        assert_eq!(stride(-7), 0);
    }

    #[test]
    fn test_stride_invariant() {
        for w in 1..2048 {
            let s = stride(w);
            let raw = w as usize * 3;
            assert_eq!(s % 4, 0);
            assert!(s >= raw);
            assert!(s - raw < 4);
            assert_eq!(s == raw, raw % 4 == 0, "width {w}");
        }
    }

    #[test]
    fn test_header_fields_round_trip() {
        let header = RasterHeader::with_fields(640, -480, 921_600);
        assert_eq!(header.width(), 640);
        assert_eq!(header.height(), -480);
        assert_eq!(header.data_size(), 921_600);
        assert_eq!(&header.as_bytes()[18..22], &640i32.to_le_bytes());
    }

    #[test]
    fn test_size_field_saturates() {
        assert_eq!(size_field(0), 0);
        assert_eq!(size_field(48), 48);
        assert_eq!(size_field(i32::MAX as usize), i32::MAX);
        assert_eq!(size_field(i32::MAX as usize + 1), i32::MAX);
        assert_eq!(size_field(usize::MAX), i32::MAX);
    }

    #[test]
    fn test_duplicate_does_not_alias() {
        let original = RasterImage::filled(3, 2, [1, 2, 3]);
        let mut copy = original.duplicate();
        copy.data_mut()[0] = 99;
        assert_eq!(original.data()[0], 1);
        assert_eq!(copy.header(), original.header());
    }

    #[test]
    fn test_rows_clamped_to_buffer() {
        let header = RasterHeader::with_fields(2, 10, 16);
        let image = RasterImage::new(2, 10, vec![0; 16], header);
        assert_eq!(image.stride(), 8);
        assert_eq!(image.rows(), 2);

        let negative = RasterImage::new(-2, 3, vec![0; 16], header);
        assert_eq!(negative.rows(), 0);
        assert_eq!(negative.columns(), 0);
    }

    #[test]
    fn test_filled_sets_every_pixel() {
        let image = RasterImage::filled(5, 3, [10, 20, 30]);
        assert_eq!(image.size(), 16 * 3);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(image.pixel(x, y), [10, 20, 30]);
            }
            // padding stays zero
            assert_eq!(image.data()[y * 16 + 15], 0);
        }
    }
}
