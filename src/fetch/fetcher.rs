use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

use crate::fetch::error::FetchError;
use crate::fetch::payloads::is_known_error_payload;

/// A raw HTTP response before image validation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// A validated image response.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Bytes,
    pub content_type: String,
    pub http_status: u16,
}

/// Fetcher trait defining the transport for source image downloads
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Perform one GET against `url`, returning the raw response.
    ///
    /// Transport failures (connect, TLS, timeout) surface as
    /// `FetchError::Network`; HTTP error statuses are returned as a
    /// `RawResponse` and judged by `fetch_image`.
    async fn fetch(&self, url: &str) -> Result<RawResponse, FetchError>;
}

/// Implementation of Fetcher trait for Arc<T> where T implements Fetcher
#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<RawResponse, FetchError> {
        (**self).fetch(url).await
    }
}

/// Fetch and validate an image: 2xx status, `image/*` content type, size
/// ceiling, and the per-source known-error-payload table.
pub async fn fetch_image<F: Fetcher>(
    fetcher: &F,
    url: &str,
    source_name: Option<&str>,
    max_bytes: usize,
) -> Result<FetchedImage, FetchError> {
    let response = fetcher.fetch(url).await?;

    if !(200..300).contains(&response.status) {
        return Err(FetchError::HttpStatus(response.status));
    }

    let content_type = response.content_type.unwrap_or_default();
    if !content_type.starts_with("image/") {
        return Err(FetchError::InvalidContentType(content_type));
    }

    if response.body.len() > max_bytes {
        return Err(FetchError::TooLarge {
            size: response.body.len(),
            max: max_bytes,
        });
    }

    if let Some(name) = source_name {
        if is_known_error_payload(name, response.body.len()) {
            debug!(
                "response of {} bytes matches the {} error placeholder",
                response.body.len(),
                name
            );
            return Err(FetchError::KnownErrorPayload);
        }
    }

    Ok(FetchedImage {
        bytes: response.body,
        content_type,
        http_status: response.status,
    })
}
