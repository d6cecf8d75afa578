use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::catalog::error::CatalogError;
use crate::catalog::models::{
    Assignment, ImageRecord, ImageSource, ImageStatus, IngestEvent, NewDerivative, NewImage,
};

/// Catalog trait for the relational store behind the pipeline
#[async_trait]
pub trait Catalog: Send + Sync + 'static {
    /// Look up an image id by content digest. A miss is `Ok(None)`, never
    /// an error.
    async fn find_image_by_sha256(&self, sha256: &str) -> Result<Option<Uuid>, CatalogError>;

    /// Read back a persisted image by id.
    async fn find_image(&self, id: Uuid) -> Result<Option<ImageRecord>, CatalogError>;

    /// Look up a source by its id.
    async fn get_image_source(&self, id: &str) -> Result<Option<ImageSource>, CatalogError>;

    /// Look up a source by its unique name.
    async fn get_image_source_by_name(&self, name: &str)
        -> Result<Option<ImageSource>, CatalogError>;

    /// Insert a new image with `status = processing` and return its id.
    ///
    /// The table is unique on `sha256`; losing an insert race surfaces as
    /// `CatalogError::UniqueViolation`.
    async fn create_image_record(&self, image: NewImage) -> Result<Uuid, CatalogError>;

    /// Update an image's status and error message.
    async fn update_image_status(
        &self,
        id: Uuid,
        status: ImageStatus,
        error: Option<&str>,
    ) -> Result<(), CatalogError>;

    /// Insert one derivative row; unique per `(image_id, variant)`.
    async fn create_derivative_record(
        &self,
        image_id: Uuid,
        derivative: NewDerivative,
    ) -> Result<(), CatalogError>;

    /// Upsert a card-image assignment on `(card_id, role)`, overwriting any
    /// previous mapping.
    async fn assign_image_to_card(&self, assignment: Assignment) -> Result<(), CatalogError>;

    /// Append one entry to the ingest event log.
    ///
    /// Callers treat this as fire-and-forget; a failure here must never
    /// fail the job.
    async fn log_ingest_event(&self, event: IngestEvent) -> Result<(), CatalogError>;
}

/// Implementation of Catalog trait for Arc<T> where T implements Catalog
#[async_trait]
impl<T: Catalog + ?Sized> Catalog for Arc<T> {
    async fn find_image_by_sha256(&self, sha256: &str) -> Result<Option<Uuid>, CatalogError> {
        (**self).find_image_by_sha256(sha256).await
    }

    async fn find_image(&self, id: Uuid) -> Result<Option<ImageRecord>, CatalogError> {
        (**self).find_image(id).await
    }

    async fn get_image_source(&self, id: &str) -> Result<Option<ImageSource>, CatalogError> {
        (**self).get_image_source(id).await
    }

    async fn get_image_source_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ImageSource>, CatalogError> {
        (**self).get_image_source_by_name(name).await
    }

    async fn create_image_record(&self, image: NewImage) -> Result<Uuid, CatalogError> {
        (**self).create_image_record(image).await
    }

    async fn update_image_status(
        &self,
        id: Uuid,
        status: ImageStatus,
        error: Option<&str>,
    ) -> Result<(), CatalogError> {
        (**self).update_image_status(id, status, error).await
    }

    async fn create_derivative_record(
        &self,
        image_id: Uuid,
        derivative: NewDerivative,
    ) -> Result<(), CatalogError> {
        (**self).create_derivative_record(image_id, derivative).await
    }

    async fn assign_image_to_card(&self, assignment: Assignment) -> Result<(), CatalogError> {
        (**self).assign_image_to_card(assignment).await
    }

    async fn log_ingest_event(&self, event: IngestEvent) -> Result<(), CatalogError> {
        (**self).log_ingest_event(event).await
    }
}
