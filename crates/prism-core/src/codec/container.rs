//! Reading and writing the fixed-header raster container.
//!
//! Layout: a 54-byte header (width at offset 18, height at 22, pixel-data size
//! at 34, all little-endian i32) followed immediately by the pixel data.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

use super::raster::{RasterHeader, RasterImage, HEADER_LEN};

/// Decode the container at `path`.
pub fn decode(path: &Path) -> PipelineResult<RasterImage> {
    let file = File::open(path).map_err(|e| PipelineError::Decode {
        path: path.to_path_buf(),
        message: format!("Cannot open file: {}", e),
    })?;
    decode_from(BufReader::new(file), path)
}

/// Decode a container from any reader. `path` is only used for diagnostics.
///
/// The declared pixel-data size is trusted: exactly that many bytes are
/// allocated and read. Width and height are not checked against it.
pub fn decode_from<R: Read>(mut reader: R, path: &Path) -> PipelineResult<RasterImage> {
    let mut raw = [0u8; HEADER_LEN];
    reader.read_exact(&mut raw).map_err(|e| PipelineError::Decode {
        path: path.to_path_buf(),
        message: if e.kind() == io::ErrorKind::UnexpectedEof {
            format!("File shorter than the {HEADER_LEN}-byte header")
        } else {
            format!("Cannot read header: {}", e)
        },
    })?;
    let header = RasterHeader::from_bytes(raw);

    let declared = header.data_size();
    if declared < 0 {
        return Err(PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Negative pixel-data size {declared}"),
        });
    }
    let declared = declared as usize;

    let mut data = Vec::new();
    reader
        .take(declared as u64)
        .read_to_end(&mut data)
        .map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read pixel data: {}", e),
        })?;
    if data.len() < declared {
        tracing::warn!(
            "{:?}: pixel data truncated ({} of {} bytes), zero-filling",
            path,
            data.len(),
            declared
        );
        data.resize(declared, 0);
    }

    tracing::trace!(
        "Decoded {:?}: {}x{}, {} bytes",
        path,
        header.width(),
        header.height(),
        declared
    );
    Ok(RasterImage::new(header.width(), header.height(), data, header))
}

/// Write `header` followed by the full pixel buffer of `image` to `path`.
///
/// Returns the number of bytes written to disk.
pub fn encode(path: &Path, image: &RasterImage, header: &RasterHeader) -> PipelineResult<u64> {
    let to_error = |e: io::Error| PipelineError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let file = File::create(path).map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    let written = encode_to(&mut writer, image, header).map_err(to_error)?;
    writer.flush().map_err(to_error)?;
    Ok(written)
}

/// Write a container to any writer. Returns the number of bytes written.
pub fn encode_to<W: Write>(
    writer: &mut W,
    image: &RasterImage,
    header: &RasterHeader,
) -> io::Result<u64> {
    writer.write_all(header.as_bytes())?;
    writer.write_all(image.data())?;
    Ok((HEADER_LEN + image.size()) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn container(width: i32, height: i32, pixels: &[u8]) -> Vec<u8> {
        let header = RasterHeader::with_fields(width, height, pixels.len() as i32);
        let mut bytes = header.as_bytes().to_vec();
        bytes.extend_from_slice(pixels);
        bytes
    }

    #[test]
    fn test_decode_reads_fields_and_pixels() {
        let bytes = container(1, 1, &[10, 20, 30, 0]);
        let image = decode_from(Cursor::new(bytes), Path::new("mem")).unwrap();
        assert_eq!(image.width(), 1);
        assert_eq!(image.height(), 1);
        assert_eq!(image.size(), 4);
        assert_eq!(image.pixel(0, 0), [10, 20, 30]);
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.bmp");
        let dst = dir.path().join("out.bmp");

        let mut bytes = container(2, 2, &(0u8..16).collect::<Vec<_>>());
        // opaque bytes outside the three known fields must survive too
        bytes[0] = b'B';
        bytes[1] = b'M';
        bytes[50] = 0xAB;
        std::fs::write(&src, &bytes).unwrap();

        let image = decode(&src).unwrap();
        let written = encode(&dst, &image, image.header()).unwrap();

        assert_eq!(written, bytes.len() as u64);
        assert_eq!(std::fs::read(&dst).unwrap(), bytes);
    }

    #[test]
    fn test_declared_size_is_trusted_over_dimensions() {
        // 2x2 needs 16 bytes but the header declares 6; trailing bytes are ignored
        let header = RasterHeader::with_fields(2, 2, 6);
        let mut bytes = header.as_bytes().to_vec();
        bytes.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

        let image = decode_from(Cursor::new(bytes), Path::new("mem")).unwrap();
        assert_eq!(image.size(), 6);
        assert_eq!(image.rows(), 0);
    }

    #[test]
    fn test_short_pixel_data_is_zero_filled() {
        let header = RasterHeader::with_fields(1, 1, 4);
        let mut bytes = header.as_bytes().to_vec();
        bytes.extend_from_slice(&[7, 8]);

        let image = decode_from(Cursor::new(bytes), Path::new("mem")).unwrap();
        assert_eq!(image.data(), &[7, 8, 0, 0]);
    }

    #[test]
    fn test_oversized_declaration_reads_only_available_bytes() {
        // a header claiming far more data than the stream holds
        let declared = 8 << 20;
        let header = RasterHeader::with_fields(4, 4, declared);
        let mut bytes = header.as_bytes().to_vec();
        bytes.extend_from_slice(&[1, 2, 3]);

        let image = decode_from(Cursor::new(bytes), Path::new("huge.bmp")).unwrap();
        assert_eq!(image.size(), declared as usize);
        assert_eq!(&image.data()[..4], &[1, 2, 3, 0]);
        assert!(image.data()[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_short_header_is_an_error() {
        let err = decode_from(Cursor::new(vec![0u8; 20]), Path::new("tiny.bmp")).unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
        assert!(err.to_string().contains("54-byte header"));
    }

    #[test]
    fn test_negative_size_is_an_error() {
        let mut bytes = container(1, 1, &[]);
        bytes[34..38].copy_from_slice(&(-1i32).to_le_bytes());
        let err = decode_from(Cursor::new(bytes), Path::new("neg.bmp")).unwrap_err();
        assert!(err.to_string().contains("Negative"));
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode(&dir.path().join("absent.bmp")).unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[test]
    fn test_encode_uses_supplied_header() {
        let image = RasterImage::filled(1, 1, [1, 2, 3]);
        let other = RasterHeader::with_fields(9, 9, 4);
        let mut out = Vec::new();
        encode_to(&mut out, &image, &other).unwrap();
        assert_eq!(&out[..HEADER_LEN], other.as_bytes());
        assert_eq!(&out[HEADER_LEN..], &[1, 2, 3, 0]);
    }

    #[test]
    fn test_encode_to_unwritable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("out.bmp");
        let image = RasterImage::filled(1, 1, [0, 0, 0]);
        let err = encode(&path, &image, image.header()).unwrap_err();
        assert!(matches!(err, PipelineError::Encode { .. }));
    }
}
