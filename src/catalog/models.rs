use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::imaging::{CardSide, DerivativeVariant, DetectionMethod};

/// A row from the `image_sources` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub trust_tier: i16,
    pub max_rps: i32,
    pub max_concurrency: i32,
    pub is_allowed: bool,
}

/// Lifecycle status of a persisted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Processing,
    Completed,
    Failed,
}

impl ImageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStatus::Processing => "processing",
            ImageStatus::Completed => "completed",
            ImageStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "completed" => ImageStatus::Completed,
            "failed" => ImageStatus::Failed,
            _ => ImageStatus::Processing,
        }
    }
}

/// Fields for inserting a new `images` row.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub sha256: String,
    pub original_mime: String,
    pub original_width: i32,
    pub original_height: i32,
    pub original_bytes: i64,
    pub detected_side: CardSide,
    pub side_confidence: f64,
    pub is_collage: bool,
    pub detected_method: DetectionMethod,
}

/// A persisted image as read back from the catalog.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub id: Uuid,
    pub sha256: String,
    pub status: ImageStatus,
    pub detected_side: CardSide,
    pub side_confidence: f64,
    pub is_collage: bool,
    pub error: Option<String>,
}

/// Fields for inserting one `image_derivatives` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDerivative {
    pub variant: DerivativeVariant,
    pub format: String,
    pub width: i32,
    pub height: i32,
    pub bytes: i64,
    pub storage_path: String,
}

/// An upsert into `card_images` on `(card_id, role)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub card_id: String,
    pub image_id: Uuid,
    pub role: String,
    pub source_id: Option<String>,
    pub source_url: Option<String>,
}

/// Event taxonomy for the append-only `image_ingest_events` log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    FetchStarted,
    FetchCompleted,
    FetchFailed,
    Deduplicated,
    ValidationFailed,
    ValidationPassed,
    ProcessingStarted,
    DerivativesGenerated,
    UploadCompleted,
    ProcessingCompleted,
    Rejected,
    Assigned,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::FetchStarted => "fetch_started",
            EventType::FetchCompleted => "fetch_completed",
            EventType::FetchFailed => "fetch_failed",
            EventType::Deduplicated => "deduplicated",
            EventType::ValidationFailed => "validation_failed",
            EventType::ValidationPassed => "validation_passed",
            EventType::ProcessingStarted => "processing_started",
            EventType::DerivativesGenerated => "derivatives_generated",
            EventType::UploadCompleted => "upload_completed",
            EventType::ProcessingCompleted => "processing_completed",
            EventType::Rejected => "rejected",
            EventType::Assigned => "assigned",
        }
    }
}

/// One entry in the ingest event log.
#[derive(Debug, Clone)]
pub struct IngestEvent {
    pub card_id: Option<String>,
    pub candidate_id: Option<String>,
    pub image_id: Option<Uuid>,
    pub event_type: EventType,
    pub message: Option<String>,
    pub http_status: Option<i32>,
    pub metadata: Option<serde_json::Value>,
}

impl IngestEvent {
    /// An event scoped to a card with everything else unset.
    pub fn for_card(card_id: &str, event_type: EventType) -> Self {
        IngestEvent {
            card_id: Some(card_id.to_string()),
            candidate_id: None,
            image_id: None,
            event_type,
            message: None,
            http_status: None,
            metadata: None,
        }
    }

    pub fn with_image(mut self, image_id: Uuid) -> Self {
        self.image_id = Some(image_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_http_status(mut self, status: i32) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
