use thiserror::Error;

/// Errors that can occur while fetching an image from a source
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{0}")]
    Network(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    #[error("Response body of {size} bytes exceeds the limit of {max}")]
    TooLarge { size: usize, max: usize },

    #[error("known_error_payload")]
    KnownErrorPayload,
}

impl FetchError {
    /// The HTTP status associated with this failure, when there is one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus(status) => Some(*status),
            _ => None,
        }
    }
}
