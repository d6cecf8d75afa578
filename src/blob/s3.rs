use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::{config::Region, Client};
use bytes::Bytes;
use tracing::{debug, info};

use crate::blob::error::BlobError;
use crate::blob::store::BlobStore;
use crate::blob::IMMUTABLE_CACHE_CONTROL;
use crate::config::BlobConfig;
use crate::hashing;

/// Real S3-compatible implementation of the BlobStore trait
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    public_base_url: Option<String>,
}

impl S3BlobStore {
    /// Create a new S3BlobStore instance from configuration
    pub async fn new(config: &BlobConfig) -> Result<Self, BlobError> {
        let config_loader = aws_config::from_env().region(Region::new(config.region.clone()));

        // If access key and secret are provided, use them for credentials
        let aws_config = if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "StaticCredentialsProvider",
            );

            config_loader.credentials_provider(credentials).load().await
        } else {
            config_loader.load().await
        };

        let mut client_builder = aws_sdk_s3::config::Builder::from(&aws_config);
        if let Some(endpoint) = &config.endpoint {
            client_builder = client_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(client_builder.build());

        info!(
            "Connected to blob store bucket {} in region {}",
            config.bucket, config.region
        );

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.clone(),
        })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put_object(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), BlobError> {
        debug!("uploading {} ({} bytes)", path, data.len());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(data.into())
            .content_type(content_type)
            .cache_control(IMMUTABLE_CACHE_CONTROL)
            .send()
            .await
            .map_err(|e| BlobError::UploadError(path.to_string(), e.to_string()))?;

        if let Some(base_url) = &self.public_base_url {
            debug!(
                "object available at {}",
                hashing::public_url(base_url, &self.bucket, path)
            );
        }

        Ok(())
    }
}
