use async_trait::async_trait;
use std::sync::Arc;

use crate::imaging::SideDetection;
use crate::vision::error::VisionError;

/// Context for one vision check.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub trust_tier: i16,
    pub card_number: Option<String>,
    pub set_code: Option<String>,
}

/// VisionChecker trait for the external multimodal model
#[async_trait]
pub trait VisionChecker: Send + Sync + 'static {
    /// Classify the image as card front or back.
    ///
    /// An `Err` means the model could not be consulted; the caller falls
    /// back to the heuristic verdict.
    async fn check(
        &self,
        bytes: &[u8],
        content_type: &str,
        request: &VisionRequest,
    ) -> Result<SideDetection, VisionError>;
}

/// Implementation of VisionChecker trait for Arc<T> where T implements VisionChecker
#[async_trait]
impl<T: VisionChecker + ?Sized> VisionChecker for Arc<T> {
    async fn check(
        &self,
        bytes: &[u8],
        content_type: &str,
        request: &VisionRequest,
    ) -> Result<SideDetection, VisionError> {
        (**self).check(bytes, content_type, request).await
    }
}
