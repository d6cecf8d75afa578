use thiserror::Error;

use crate::blob::BlobError;
use crate::catalog::CatalogError;
use crate::imaging::ImagingError;

/// Errors that abort a job partway through the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Blob store error: {0}")]
    Blob(#[from] BlobError),

    #[error("Image processing error: {0}")]
    Imaging(#[from] ImagingError),

    #[error("Background task failed: {0}")]
    Task(String),
}
