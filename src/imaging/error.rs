use thiserror::Error;

/// Errors that can occur while decoding or transforming image bytes
#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Image format could not be determined")]
    UnknownFormat,

    #[error("Image dimensions could not be determined")]
    UnknownDimensions,

    #[error("Image has {pixels} pixels, exceeding the limit of {max}")]
    PixelBudgetExceeded { pixels: u64, max: u64 },
}

impl From<image::ImageError> for ImagingError {
    fn from(value: image::ImageError) -> Self {
        ImagingError::DecodeError(value.to_string())
    }
}
