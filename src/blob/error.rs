use thiserror::Error;

/// Errors that can occur when writing to the blob store
#[derive(Error, Debug)]
#[allow(dead_code)]
pub enum BlobError {
    #[error("Failed to connect to blob store: {0}")]
    ConnectionError(String),

    #[error("Failed to upload object {0}: {1}")]
    UploadError(String, String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Other blob store error: {0}")]
    Other(#[from] anyhow::Error),
}
