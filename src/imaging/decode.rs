use std::io::Cursor;

use image::ImageReader;
use tracing::debug;

use crate::imaging::error::ImagingError;

/// Validated metadata for a fetched image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// MIME type derived from the magic bytes, e.g. `image/jpeg`.
    pub format: String,
    pub size_bytes: usize,
}

/// Read dimensions and format from the image header without decoding the
/// pixel data, and enforce the pixel budget.
pub fn probe_metadata(bytes: &[u8], max_pixels: u64) -> Result<ImageMetadata, ImagingError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImagingError::DecodeError(e.to_string()))?;

    let format = reader.format().ok_or(ImagingError::UnknownFormat)?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|_| ImagingError::UnknownDimensions)?;

    if width == 0 || height == 0 {
        return Err(ImagingError::UnknownDimensions);
    }

    let pixels = u64::from(width) * u64::from(height);
    if pixels > max_pixels {
        return Err(ImagingError::PixelBudgetExceeded {
            pixels,
            max: max_pixels,
        });
    }

    debug!(
        "probed image: {}x{} {} ({} bytes)",
        width,
        height,
        format.to_mime_type(),
        bytes.len()
    );

    Ok(ImageMetadata {
        width,
        height,
        format: format.to_mime_type().to_string(),
        size_bytes: bytes.len(),
    })
}
