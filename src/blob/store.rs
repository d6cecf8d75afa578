use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::blob::error::BlobError;

/// BlobStore trait defining the interface for uploading derivative objects
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// PUT an object at `path` with the given content type. Re-uploading the
    /// same path overwrites (upsert semantics); no retries are performed.
    async fn put_object(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), BlobError>;
}

/// Implementation of BlobStore trait for Arc<T> where T implements BlobStore
#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    async fn put_object(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), BlobError> {
        (**self).put_object(path, data, content_type).await
    }
}
