use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::imaging::{CardSide, SideDetection};

/// One inbound ingest job, as posted by the orchestrating HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageJob {
    pub card_id: String,
    pub source_url: String,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    /// Fallback trust tier when neither source reference resolves.
    #[serde(default)]
    pub trust_tier: Option<i16>,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub set_code: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
}

/// Terminal disposition of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Completed,
    Failed,
    Deduplicated,
    Rejected,
    RateLimited,
}

/// The structured result returned to the caller for every job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResult {
    pub status: ProcessStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_side: Option<CardSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessResult {
    fn empty(status: ProcessStatus) -> Self {
        ProcessResult {
            status,
            image_id: None,
            sha256: None,
            detected_side: None,
            confidence: None,
            error: None,
        }
    }

    pub fn completed(image_id: Uuid, sha256: String, side: SideDetection) -> Self {
        ProcessResult {
            image_id: Some(image_id),
            sha256: Some(sha256),
            detected_side: Some(side.side),
            confidence: Some(side.confidence),
            ..Self::empty(ProcessStatus::Completed)
        }
    }

    pub fn rejected(image_id: Uuid, sha256: String, side: SideDetection, error: String) -> Self {
        ProcessResult {
            image_id: Some(image_id),
            sha256: Some(sha256),
            detected_side: Some(side.side),
            confidence: Some(side.confidence),
            error: Some(error),
            ..Self::empty(ProcessStatus::Rejected)
        }
    }

    pub fn deduplicated(image_id: Uuid, sha256: String) -> Self {
        ProcessResult {
            image_id: Some(image_id),
            sha256: Some(sha256),
            ..Self::empty(ProcessStatus::Deduplicated)
        }
    }

    pub fn rate_limited(wait_ms: u64) -> Self {
        ProcessResult {
            error: Some(format!("Rate limited, retry after {}ms", wait_ms)),
            ..Self::empty(ProcessStatus::RateLimited)
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        ProcessResult {
            error: Some(error.into()),
            ..Self::empty(ProcessStatus::Failed)
        }
    }
}
