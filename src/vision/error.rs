use thiserror::Error;

/// Errors that can occur when calling the vision model
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Vision API returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Failed to parse vision response: {0}")]
    ParseError(String),
}
