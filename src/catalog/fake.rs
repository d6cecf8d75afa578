use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::catalog::error::CatalogError;
use crate::catalog::gateway::Catalog;
use crate::catalog::models::{
    Assignment, EventType, ImageRecord, ImageSource, ImageStatus, IngestEvent, NewDerivative,
    NewImage,
};

/// A fake in-memory implementation of the Catalog trait for testing
#[derive(Clone)]
pub struct FakeCatalog {
    sources: Arc<RwLock<HashMap<String, ImageSource>>>,
    images: Arc<RwLock<HashMap<Uuid, ImageRecord>>>,
    derivatives: Arc<RwLock<Vec<(Uuid, NewDerivative)>>>,
    assignments: Arc<RwLock<HashMap<(String, String), Assignment>>>,
    events: Arc<RwLock<Vec<IngestEvent>>>,
    fail_event_logging: Arc<RwLock<bool>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        FakeCatalog {
            sources: Arc::new(RwLock::new(HashMap::new())),
            images: Arc::new(RwLock::new(HashMap::new())),
            derivatives: Arc::new(RwLock::new(Vec::new())),
            assignments: Arc::new(RwLock::new(HashMap::new())),
            events: Arc::new(RwLock::new(Vec::new())),
            fail_event_logging: Arc::new(RwLock::new(false)),
        }
    }

    /// Register a source row.
    pub fn fake_add_source(&self, source: ImageSource) {
        let mut sources = self.sources.write().unwrap();
        sources.insert(source.id.clone(), source);
    }

    /// Make `log_ingest_event` fail, to exercise fire-and-forget call sites.
    pub fn fake_fail_event_logging(&self) {
        *self.fail_event_logging.write().unwrap() = true;
    }

    pub fn fake_image(&self, id: Uuid) -> Option<ImageRecord> {
        self.images.read().unwrap().get(&id).cloned()
    }

    pub fn fake_image_count(&self) -> usize {
        self.images.read().unwrap().len()
    }

    pub fn fake_derivatives_for(&self, image_id: Uuid) -> Vec<NewDerivative> {
        self.derivatives
            .read()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == image_id)
            .map(|(_, d)| d.clone())
            .collect()
    }

    pub fn fake_assignment(&self, card_id: &str, role: &str) -> Option<Assignment> {
        self.assignments
            .read()
            .unwrap()
            .get(&(card_id.to_string(), role.to_string()))
            .cloned()
    }

    pub fn fake_events(&self) -> Vec<IngestEvent> {
        self.events.read().unwrap().clone()
    }

    pub fn fake_event_types(&self) -> Vec<EventType> {
        self.events
            .read()
            .unwrap()
            .iter()
            .map(|e| e.event_type)
            .collect()
    }
}

impl Default for FakeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn find_image_by_sha256(&self, sha256: &str) -> Result<Option<Uuid>, CatalogError> {
        let images = self.images.read().unwrap();
        Ok(images
            .values()
            .find(|image| image.sha256 == sha256)
            .map(|image| image.id))
    }

    async fn find_image(&self, id: Uuid) -> Result<Option<ImageRecord>, CatalogError> {
        let images = self.images.read().unwrap();
        Ok(images.get(&id).cloned())
    }

    async fn get_image_source(&self, id: &str) -> Result<Option<ImageSource>, CatalogError> {
        let sources = self.sources.read().unwrap();
        Ok(sources.get(id).cloned())
    }

    async fn get_image_source_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ImageSource>, CatalogError> {
        let sources = self.sources.read().unwrap();
        Ok(sources.values().find(|s| s.name == name).cloned())
    }

    async fn create_image_record(&self, image: NewImage) -> Result<Uuid, CatalogError> {
        let mut images = self.images.write().unwrap();
        if images.values().any(|existing| existing.sha256 == image.sha256) {
            return Err(CatalogError::UniqueViolation(format!(
                "duplicate key value violates unique constraint images_sha256_key: {}",
                image.sha256
            )));
        }

        let id = Uuid::new_v4();
        images.insert(
            id,
            ImageRecord {
                id,
                sha256: image.sha256,
                status: ImageStatus::Processing,
                detected_side: image.detected_side,
                side_confidence: image.side_confidence,
                is_collage: image.is_collage,
                error: None,
            },
        );
        Ok(id)
    }

    async fn update_image_status(
        &self,
        id: Uuid,
        status: ImageStatus,
        error: Option<&str>,
    ) -> Result<(), CatalogError> {
        let mut images = self.images.write().unwrap();
        let image = images
            .get_mut(&id)
            .ok_or_else(|| CatalogError::QueryError(format!("no image with id {}", id)))?;
        image.status = status;
        image.error = error.map(|e| e.to_string());
        Ok(())
    }

    async fn create_derivative_record(
        &self,
        image_id: Uuid,
        derivative: NewDerivative,
    ) -> Result<(), CatalogError> {
        let mut derivatives = self.derivatives.write().unwrap();
        if derivatives
            .iter()
            .any(|(id, d)| *id == image_id && d.variant == derivative.variant)
        {
            return Err(CatalogError::UniqueViolation(format!(
                "duplicate derivative {} for image {}",
                derivative.variant.as_str(),
                image_id
            )));
        }
        derivatives.push((image_id, derivative));
        Ok(())
    }

    async fn assign_image_to_card(&self, assignment: Assignment) -> Result<(), CatalogError> {
        let mut assignments = self.assignments.write().unwrap();
        assignments.insert(
            (assignment.card_id.clone(), assignment.role.clone()),
            assignment,
        );
        Ok(())
    }

    async fn log_ingest_event(&self, event: IngestEvent) -> Result<(), CatalogError> {
        if *self.fail_event_logging.read().unwrap() {
            return Err(CatalogError::QueryError(
                "event log unavailable".to_string(),
            ));
        }
        self.events.write().unwrap().push(event);
        Ok(())
    }
}
