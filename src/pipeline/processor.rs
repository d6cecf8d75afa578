use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tokio::task;
use tracing::{info, warn};
use uuid::Uuid;

use crate::blob::BlobStore;
use crate::catalog::{
    Assignment, Catalog, EventType, ImageSource, ImageStatus, IngestEvent, NewDerivative,
    NewImage, PRIMARY_FRONT_ROLE,
};
use crate::config::PipelineConfig;
use crate::fetch::{fetch_image, FetchedImage, Fetcher};
use crate::hashing;
use crate::imaging::{self, CardSide, SideDetection};
use crate::pipeline::error::PipelineError;
use crate::pipeline::job::{ImageJob, ProcessResult};
use crate::ratelimit::RateLimiter;
use crate::vision::{should_run_vision_check, VisionChecker, VisionRequest};

/// Orchestrates the ingest pipeline for one job at a time, over the four
/// external seams: catalog, blob store, source fetcher and vision model.
///
/// Stages run strictly in order; each consumes the previous stage's
/// output. Jobs for different cards may run concurrently against the same
/// processor, sharing the rate limiter and the collaborator handles.
pub struct Processor<C: Catalog, B: BlobStore, F: Fetcher, V: VisionChecker> {
    catalog: Arc<C>,
    blob_store: Arc<B>,
    fetcher: Arc<F>,
    vision: Arc<V>,
    rate_limiter: RateLimiter,
    config: PipelineConfig,
}

impl<C: Catalog, B: BlobStore, F: Fetcher, V: VisionChecker> Processor<C, B, F, V> {
    pub fn new(
        catalog: C,
        blob_store: B,
        fetcher: F,
        vision: V,
        rate_limiter: RateLimiter,
        config: PipelineConfig,
    ) -> Self {
        Processor {
            catalog: Arc::new(catalog),
            blob_store: Arc::new(blob_store),
            fetcher: Arc::new(fetcher),
            vision: Arc::new(vision),
            rate_limiter,
            config,
        }
    }

    /// Run one job through the pipeline. Never returns an error: anything
    /// the stages do not handle themselves becomes a `failed` result with
    /// a `fetch_failed` event.
    pub async fn process(&self, job: ImageJob) -> ProcessResult {
        let started = Instant::now();
        info!(
            "processing image for card {} from {}",
            job.card_id, job.source_url
        );

        match self.run(&job, started).await {
            Ok(result) => result,
            Err(e) => {
                warn!("pipeline failed for card {}: {}", job.card_id, e);
                self.emit(
                    IngestEvent::for_card(&job.card_id, EventType::FetchFailed)
                        .with_message(e.to_string()),
                )
                .await;
                ProcessResult::failed(e.to_string())
            }
        }
    }

    async fn run(&self, job: &ImageJob, started: Instant) -> Result<ProcessResult, PipelineError> {
        self.emit(
            IngestEvent::for_card(&job.card_id, EventType::FetchStarted)
                .with_message(&job.source_url),
        )
        .await;

        let source = self.resolve_source(job).await?;
        let trust_tier = source
            .as_ref()
            .map(|s| s.trust_tier)
            .or(job.trust_tier)
            .unwrap_or(3);
        let source_name = source
            .as_ref()
            .map(|s| s.name.clone())
            .or_else(|| job.source_name.clone());

        if let Some(source) = &source {
            self.rate_limiter
                .ensure_bucket(&source.id, source.max_rps.max(1) as u32)
                .await;
            if !self.rate_limiter.try_acquire(&source.id).await {
                let wait_ms = self.rate_limiter.wait_time_ms(&source.id).await;
                return Ok(ProcessResult::rate_limited(wait_ms));
            }
        }

        let fetched = match fetch_image(
            &self.fetcher,
            &job.source_url,
            source_name.as_deref(),
            self.config.max_fetch_bytes,
        )
        .await
        {
            Ok(fetched) => fetched,
            Err(e) => {
                let mut event = IngestEvent::for_card(&job.card_id, EventType::FetchFailed)
                    .with_message(e.to_string());
                if let Some(status) = e.http_status() {
                    event = event.with_http_status(i32::from(status));
                }
                self.emit(event).await;
                return Ok(ProcessResult::failed(e.to_string()));
            }
        };
        info!(
            "fetched {} for card {}: HTTP {}, {} bytes",
            job.source_url,
            job.card_id,
            fetched.http_status,
            fetched.bytes.len()
        );
        self.emit(
            IngestEvent::for_card(&job.card_id, EventType::FetchCompleted).with_metadata(json!({
                "bytes": fetched.bytes.len(),
                "contentType": fetched.content_type,
            })),
        )
        .await;

        let sha256 = {
            let bytes = fetched.bytes.clone();
            task::spawn_blocking(move || hashing::sha256_hex(&bytes))
                .await
                .map_err(|e| PipelineError::Task(e.to_string()))?
        };

        if let Some(existing) = self.catalog.find_image_by_sha256(&sha256).await? {
            return self.handle_dedup(job, &source, existing, &sha256).await;
        }

        let metadata = {
            let bytes = fetched.bytes.clone();
            let max_pixels = self.config.max_image_pixels;
            let probed = task::spawn_blocking(move || imaging::probe_metadata(&bytes, max_pixels))
                .await
                .map_err(|e| PipelineError::Task(e.to_string()))?;
            match probed {
                Ok(metadata) => metadata,
                Err(e) => {
                    self.emit(
                        IngestEvent::for_card(&job.card_id, EventType::ValidationFailed)
                            .with_message(e.to_string()),
                    )
                    .await;
                    return Ok(ProcessResult::failed(e.to_string()));
                }
            }
        };

        let heuristic = {
            let bytes = fetched.bytes.clone();
            let (width, height) = (metadata.width, metadata.height);
            task::spawn_blocking(move || imaging::detect_side(&bytes, width, height))
                .await
                .map_err(|e| PipelineError::Task(e.to_string()))?
        };

        let is_collage = {
            let bytes = fetched.bytes.clone();
            let (width, height) = (metadata.width, metadata.height);
            task::spawn_blocking(move || imaging::detect_collage(&bytes, width, height))
                .await
                .map_err(|e| PipelineError::Task(e.to_string()))?
        };

        let mut side_result = heuristic;
        if should_run_vision_check(
            trust_tier,
            side_result.confidence,
            self.config.vision_check_lower_bound,
            self.config.vision_check_upper_bound,
            self.config.vision_sample_rate,
        ) {
            let request = VisionRequest {
                trust_tier,
                card_number: job.card_number.clone(),
                set_code: job.set_code.clone(),
            };
            match self
                .vision
                .check(&fetched.bytes, &fetched.content_type, &request)
                .await
            {
                Ok(vision_result) => {
                    if vision_result.confidence > side_result.confidence {
                        side_result = vision_result;
                    }
                }
                Err(e) => {
                    warn!("vision check failed for card {}: {}", job.card_id, e);
                }
            }
        }

        self.emit(
            IngestEvent::for_card(&job.card_id, EventType::ValidationPassed).with_metadata(json!({
                "width": metadata.width,
                "height": metadata.height,
                "side": side_result.side.as_str(),
                "confidence": side_result.confidence,
                "isCollage": is_collage,
                "method": side_result.method.as_str(),
            })),
        )
        .await;

        self.emit(IngestEvent::for_card(&job.card_id, EventType::ProcessingStarted))
            .await;

        let image_id = self
            .catalog
            .create_image_record(NewImage {
                sha256: sha256.clone(),
                original_mime: fetched.content_type.clone(),
                original_width: metadata.width as i32,
                original_height: metadata.height as i32,
                original_bytes: metadata.size_bytes as i64,
                detected_side: side_result.side,
                side_confidence: side_result.confidence,
                is_collage,
                detected_method: side_result.method,
            })
            .await?;

        // From here the image row exists; a failure in any later stage must
        // not leave it stranded in the processing state.
        match self
            .finish(job, &source, image_id, &sha256, &fetched, side_result, is_collage, started)
            .await
        {
            Ok(result) => Ok(result),
            Err(e) => {
                if let Err(update_err) = self
                    .catalog
                    .update_image_status(image_id, ImageStatus::Failed, Some(&e.to_string()))
                    .await
                {
                    warn!("failed to mark image {} as failed: {}", image_id, update_err);
                }
                Err(e)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn finish(
        &self,
        job: &ImageJob,
        source: &Option<ImageSource>,
        image_id: Uuid,
        sha256: &str,
        fetched: &FetchedImage,
        side_result: SideDetection,
        is_collage: bool,
        started: Instant,
    ) -> Result<ProcessResult, PipelineError> {
        let derivatives = {
            let bytes = fetched.bytes.clone();
            let sha = sha256.to_string();
            task::spawn_blocking(move || imaging::generate_derivatives(&bytes, &sha))
                .await
                .map_err(|e| PipelineError::Task(e.to_string()))??
        };
        self.emit(
            IngestEvent::for_card(&job.card_id, EventType::DerivativesGenerated)
                .with_image(image_id)
                .with_metadata(json!({ "count": derivatives.len() })),
        )
        .await;

        for derivative in &derivatives {
            self.blob_store
                .put_object(&derivative.storage_path, derivative.data.clone(), "image/webp")
                .await?;
        }
        self.emit(
            IngestEvent::for_card(&job.card_id, EventType::UploadCompleted).with_image(image_id),
        )
        .await;

        for derivative in &derivatives {
            self.catalog
                .create_derivative_record(
                    image_id,
                    NewDerivative {
                        variant: derivative.variant,
                        format: "webp".to_string(),
                        width: derivative.width as i32,
                        height: derivative.height as i32,
                        bytes: derivative.bytes as i64,
                        storage_path: derivative.storage_path.clone(),
                    },
                )
                .await?;
        }

        self.catalog
            .update_image_status(image_id, ImageStatus::Completed, None)
            .await?;
        self.emit(
            IngestEvent::for_card(&job.card_id, EventType::ProcessingCompleted)
                .with_image(image_id)
                .with_metadata(json!({ "elapsed_ms": started.elapsed().as_millis() as u64 })),
        )
        .await;

        let assignable = side_result.side == CardSide::Front
            && side_result.confidence >= self.config.min_confidence_for_assignment
            && !is_collage;

        if assignable {
            self.catalog
                .assign_image_to_card(self.assignment(job, source, image_id))
                .await?;
            self.emit(
                IngestEvent::for_card(&job.card_id, EventType::Assigned)
                    .with_image(image_id)
                    .with_message(PRIMARY_FRONT_ROLE),
            )
            .await;
            Ok(ProcessResult::completed(image_id, sha256.to_string(), side_result))
        } else {
            let message = format!(
                "Not assigned: side={}, confidence={:.2}, isCollage={}",
                side_result.side.as_str(),
                side_result.confidence,
                is_collage
            );
            self.emit(
                IngestEvent::for_card(&job.card_id, EventType::Rejected)
                    .with_image(image_id)
                    .with_message(&message),
            )
            .await;
            Ok(ProcessResult::rejected(image_id, sha256.to_string(), side_result, message))
        }
    }

    async fn handle_dedup(
        &self,
        job: &ImageJob,
        source: &Option<ImageSource>,
        existing: Uuid,
        sha256: &str,
    ) -> Result<ProcessResult, PipelineError> {
        info!(
            "image {} deduplicated for card {} (sha256 {})",
            existing, job.card_id, sha256
        );
        self.emit(
            IngestEvent::for_card(&job.card_id, EventType::Deduplicated).with_image(existing),
        )
        .await;

        let assign = if self.config.verify_side_on_dedup {
            match self.catalog.find_image(existing).await? {
                Some(record) => record.detected_side == CardSide::Front,
                None => false,
            }
        } else {
            true
        };

        if assign {
            self.catalog
                .assign_image_to_card(self.assignment(job, source, existing))
                .await?;
        }

        Ok(ProcessResult::deduplicated(existing, sha256.to_string()))
    }

    async fn resolve_source(&self, job: &ImageJob) -> Result<Option<ImageSource>, PipelineError> {
        if let Some(id) = &job.source_id {
            if let Some(source) = self.catalog.get_image_source(id).await? {
                return Ok(Some(source));
            }
        }
        if let Some(name) = &job.source_name {
            if let Some(source) = self.catalog.get_image_source_by_name(name).await? {
                return Ok(Some(source));
            }
        }
        Ok(None)
    }

    fn assignment(
        &self,
        job: &ImageJob,
        source: &Option<ImageSource>,
        image_id: Uuid,
    ) -> Assignment {
        Assignment {
            card_id: job.card_id.clone(),
            image_id,
            role: PRIMARY_FRONT_ROLE.to_string(),
            source_id: source
                .as_ref()
                .map(|s| s.id.clone())
                .or_else(|| job.source_id.clone()),
            source_url: Some(job.source_url.clone()),
        }
    }

    /// Fire-and-forget event emission; a logging fault never shadows the
    /// job's real result.
    async fn emit(&self, event: IngestEvent) {
        let event_type = event.event_type;
        if let Err(e) = self.catalog.log_ingest_event(event).await {
            warn!("failed to log {} event: {}", event_type.as_str(), e);
        }
    }
}
