use thiserror::Error;

/// Errors that can occur when interacting with the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to connect to catalog: {0}")]
    ConnectionError(String),

    #[error("Query execution failed: {0}")]
    QueryError(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Failed to deserialize catalog row: {0}")]
    DeserializationError(String),

    #[error("Other catalog error: {0}")]
    Other(#[from] anyhow::Error),
}
