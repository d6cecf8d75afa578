use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use crate::blob::error::BlobError;
use crate::blob::store::BlobStore;

/// A fake in-memory implementation of the BlobStore trait for testing
#[derive(Clone)]
pub struct FakeBlobStore {
    objects: Arc<RwLock<HashMap<String, (Bytes, String)>>>,
    fail_uploads: Arc<RwLock<bool>>,
}

impl FakeBlobStore {
    pub fn new() -> Self {
        FakeBlobStore {
            objects: Arc::new(RwLock::new(HashMap::new())),
            fail_uploads: Arc::new(RwLock::new(false)),
        }
    }

    /// Make every upload fail.
    pub fn fake_fail_uploads(&self) {
        *self.fail_uploads.write().unwrap() = true;
    }

    /// Stored bytes and content type for a path, if uploaded.
    pub fn fake_object(&self, path: &str) -> Option<(Bytes, String)> {
        self.objects.read().unwrap().get(path).cloned()
    }

    /// All uploaded paths, sorted.
    pub fn fake_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.read().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Default for FakeBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn put_object(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), BlobError> {
        if *self.fail_uploads.read().unwrap() {
            return Err(BlobError::UploadError(
                path.to_string(),
                "injected upload failure".to_string(),
            ));
        }

        let mut objects = self.objects.write().unwrap();
        objects.insert(path.to_string(), (data, content_type.to_string()));
        Ok(())
    }
}
