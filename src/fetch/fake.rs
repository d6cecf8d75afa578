use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use crate::fetch::error::FetchError;
use crate::fetch::fetcher::{Fetcher, RawResponse};

/// A fake in-memory implementation of the Fetcher trait for testing
#[derive(Clone)]
pub struct FakeFetcher {
    responses: Arc<RwLock<HashMap<String, RawResponse>>>,
    requests: Arc<RwLock<Vec<String>>>,
    fail_with: Arc<RwLock<Option<String>>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        FakeFetcher {
            responses: Arc::new(RwLock::new(HashMap::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
            fail_with: Arc::new(RwLock::new(None)),
        }
    }

    /// Register a 200 response with the given body and content type.
    pub fn fake_add_image(&self, url: &str, content_type: &str, body: Vec<u8>) {
        self.fake_add_response(
            url,
            RawResponse {
                status: 200,
                content_type: Some(content_type.to_string()),
                body: Bytes::from(body),
            },
        );
    }

    /// Register an arbitrary raw response for a URL.
    pub fn fake_add_response(&self, url: &str, response: RawResponse) {
        let mut responses = self.responses.write().unwrap();
        responses.insert(url.to_string(), response);
    }

    /// Make every fetch fail with a network error.
    pub fn fake_fail_with(&self, message: &str) {
        let mut fail = self.fail_with.write().unwrap();
        *fail = Some(message.to_string());
    }

    /// URLs requested so far, in order.
    pub fn fake_requests(&self) -> Vec<String> {
        self.requests.read().unwrap().clone()
    }
}

impl Default for FakeFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<RawResponse, FetchError> {
        self.requests.write().unwrap().push(url.to_string());

        if let Some(message) = self.fail_with.read().unwrap().as_ref() {
            return Err(FetchError::Network(message.clone()));
        }

        let responses = self.responses.read().unwrap();
        responses
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Network(format!("connection refused: {}", url)))
    }
}
