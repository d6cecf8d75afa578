use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row as _};
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::catalog::error::CatalogError;
use crate::catalog::gateway::Catalog;
use crate::catalog::models::{
    Assignment, ImageRecord, ImageSource, ImageStatus, IngestEvent, NewDerivative, NewImage,
};
use crate::imaging::CardSide;

/// Macro to extract a field from a database row with error handling
macro_rules! get_field {
    ($row:expr, $field:expr) => {
        $row.try_get($field)
            .map_err(|e| CatalogError::DeserializationError(e.to_string()))?
    };
}

/// Postgres SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// A PostgreSQL implementation of the Catalog trait
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Create a new PostgresCatalog with the given connection URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, CatalogError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(60))
            .connect_lazy(database_url)
            .map_err(|e| {
                error!("Failed to create connection pool: {}", e);
                CatalogError::ConnectionError(e.to_string())
            })?;

        if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
            error!("Catalog connectivity test failed: {}", e);
            return Err(CatalogError::ConnectionError(format!(
                "Catalog is not accessible: {}",
                e
            )));
        }

        info!("Catalog connection established successfully");
        Ok(PostgresCatalog { pool })
    }

    fn row_to_source(&self, row: sqlx::postgres::PgRow) -> Result<ImageSource, CatalogError> {
        Ok(ImageSource {
            id: get_field!(row, "id"),
            name: get_field!(row, "name"),
            base_url: get_field!(row, "base_url"),
            trust_tier: get_field!(row, "trust_tier"),
            max_rps: get_field!(row, "max_rps"),
            max_concurrency: get_field!(row, "max_concurrency"),
            is_allowed: get_field!(row, "is_allowed"),
        })
    }

    fn row_to_image(&self, row: sqlx::postgres::PgRow) -> Result<ImageRecord, CatalogError> {
        let status: String = get_field!(row, "status");
        let side: String = get_field!(row, "detected_side");
        Ok(ImageRecord {
            id: get_field!(row, "id"),
            sha256: get_field!(row, "sha256"),
            status: ImageStatus::parse(&status),
            detected_side: CardSide::parse(&side),
            side_confidence: get_field!(row, "side_confidence"),
            is_collage: get_field!(row, "is_collage"),
            error: get_field!(row, "error"),
        })
    }

    fn map_write_error(e: sqlx::Error) -> CatalogError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return CatalogError::UniqueViolation(db_err.message().to_string());
            }
        }
        CatalogError::QueryError(e.to_string())
    }
}

#[async_trait]
impl Catalog for PostgresCatalog {
    async fn find_image_by_sha256(&self, sha256: &str) -> Result<Option<Uuid>, CatalogError> {
        debug!("dedup probe for sha256 {}", sha256);
        let row = sqlx::query("SELECT id FROM images WHERE sha256 = $1")
            .bind(sha256)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CatalogError::QueryError(e.to_string()))?;

        match row {
            Some(row) => Ok(Some(get_field!(row, "id"))),
            None => Ok(None),
        }
    }

    async fn find_image(&self, id: Uuid) -> Result<Option<ImageRecord>, CatalogError> {
        let row = sqlx::query(
            r#"
            SELECT id, sha256, status, detected_side, side_confidence, is_collage, error
            FROM images
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CatalogError::QueryError(e.to_string()))?;

        row.map(|row| self.row_to_image(row)).transpose()
    }

    async fn get_image_source(&self, id: &str) -> Result<Option<ImageSource>, CatalogError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, base_url, trust_tier, max_rps, max_concurrency, is_allowed
            FROM image_sources
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CatalogError::QueryError(e.to_string()))?;

        row.map(|row| self.row_to_source(row)).transpose()
    }

    async fn get_image_source_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ImageSource>, CatalogError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, base_url, trust_tier, max_rps, max_concurrency, is_allowed
            FROM image_sources
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CatalogError::QueryError(e.to_string()))?;

        row.map(|row| self.row_to_source(row)).transpose()
    }

    async fn create_image_record(&self, image: NewImage) -> Result<Uuid, CatalogError> {
        debug!("inserting image record for sha256 {}", image.sha256);
        let row = sqlx::query(
            r#"
            INSERT INTO images (
                sha256, original_mime, original_width, original_height, original_bytes,
                status, detected_side, side_confidence, is_collage, detected_method, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
            RETURNING id
            "#,
        )
        .bind(&image.sha256)
        .bind(&image.original_mime)
        .bind(image.original_width)
        .bind(image.original_height)
        .bind(image.original_bytes)
        .bind(ImageStatus::Processing.as_str())
        .bind(image.detected_side.as_str())
        .bind(image.side_confidence)
        .bind(image.is_collage)
        .bind(image.detected_method.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_write_error)?;

        Ok(get_field!(row, "id"))
    }

    async fn update_image_status(
        &self,
        id: Uuid,
        status: ImageStatus,
        error: Option<&str>,
    ) -> Result<(), CatalogError> {
        sqlx::query("UPDATE images SET status = $2, error = $3, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(error)
            .execute(&self.pool)
            .await
            .map_err(|e| CatalogError::QueryError(e.to_string()))?;
        Ok(())
    }

    async fn create_derivative_record(
        &self,
        image_id: Uuid,
        derivative: NewDerivative,
    ) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
            INSERT INTO image_derivatives (
                image_id, variant, format, width, height, bytes, storage_path
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(image_id)
        .bind(derivative.variant.as_str())
        .bind(&derivative.format)
        .bind(derivative.width)
        .bind(derivative.height)
        .bind(derivative.bytes)
        .bind(&derivative.storage_path)
        .execute(&self.pool)
        .await
        .map_err(Self::map_write_error)?;
        Ok(())
    }

    async fn assign_image_to_card(&self, assignment: Assignment) -> Result<(), CatalogError> {
        debug!(
            "assigning image {} to card {} as {}",
            assignment.image_id, assignment.card_id, assignment.role
        );
        sqlx::query(
            r#"
            INSERT INTO card_images (card_id, image_id, role, source_id, source_url, assigned_at)
            VALUES ($1, $2, $3, $4, $5, now())
            ON CONFLICT (card_id, role) DO UPDATE SET
                image_id = EXCLUDED.image_id,
                source_id = EXCLUDED.source_id,
                source_url = EXCLUDED.source_url,
                assigned_at = EXCLUDED.assigned_at
            "#,
        )
        .bind(&assignment.card_id)
        .bind(assignment.image_id)
        .bind(&assignment.role)
        .bind(&assignment.source_id)
        .bind(&assignment.source_url)
        .execute(&self.pool)
        .await
        .map_err(Self::map_write_error)?;
        Ok(())
    }

    async fn log_ingest_event(&self, event: IngestEvent) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
            INSERT INTO image_ingest_events (
                card_id, candidate_id, image_id, event_type, message, http_status, metadata
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&event.card_id)
        .bind(&event.candidate_id)
        .bind(event.image_id)
        .bind(event.event_type.as_str())
        .bind(&event.message)
        .bind(event.http_status)
        .bind(&event.metadata)
        .execute(&self.pool)
        .await
        .map_err(|e| CatalogError::QueryError(e.to_string()))?;
        Ok(())
    }
}
