use uuid::Uuid;

use crate::catalog::{
    Assignment, Catalog, CatalogError, EventType, FakeCatalog, ImageSource, ImageStatus,
    IngestEvent, NewDerivative, NewImage, PRIMARY_FRONT_ROLE,
};
use crate::imaging::{CardSide, DerivativeVariant, DetectionMethod};

fn test_image(sha256: &str) -> NewImage {
    NewImage {
        sha256: sha256.to_string(),
        original_mime: "image/jpeg".to_string(),
        original_width: 734,
        original_height: 1024,
        original_bytes: 40_000,
        detected_side: CardSide::Front,
        side_confidence: 0.9,
        is_collage: false,
        detected_method: DetectionMethod::Heuristic,
    }
}

fn test_source(id: &str, name: &str) -> ImageSource {
    ImageSource {
        id: id.to_string(),
        name: name.to_string(),
        base_url: "https://images.example.com".to_string(),
        trust_tier: 1,
        max_rps: 10,
        max_concurrency: 4,
        is_allowed: true,
    }
}

#[tokio::test]
async fn sha_probe_miss_is_none_not_error() {
    let catalog = FakeCatalog::new();
    assert!(catalog.find_image_by_sha256("ab00").await.unwrap().is_none());
}

#[tokio::test]
async fn created_image_is_findable_by_sha() {
    let catalog = FakeCatalog::new();
    let id = catalog.create_image_record(test_image("ab01")).await.unwrap();

    assert_eq!(catalog.find_image_by_sha256("ab01").await.unwrap(), Some(id));

    let record = catalog.find_image(id).await.unwrap().unwrap();
    assert_eq!(record.status, ImageStatus::Processing);
    assert_eq!(record.detected_side, CardSide::Front);
    assert!(record.error.is_none());
}

#[tokio::test]
async fn duplicate_sha_insert_is_a_unique_violation() {
    let catalog = FakeCatalog::new();
    catalog.create_image_record(test_image("ab02")).await.unwrap();

    let err = catalog.create_image_record(test_image("ab02")).await.unwrap_err();
    assert!(matches!(err, CatalogError::UniqueViolation(_)));
}

#[tokio::test]
async fn status_update_stores_error_message() {
    let catalog = FakeCatalog::new();
    let id = catalog.create_image_record(test_image("ab03")).await.unwrap();

    catalog
        .update_image_status(id, ImageStatus::Failed, Some("upload failed"))
        .await
        .unwrap();

    let record = catalog.find_image(id).await.unwrap().unwrap();
    assert_eq!(record.status, ImageStatus::Failed);
    assert_eq!(record.error.as_deref(), Some("upload failed"));
}

#[tokio::test]
async fn derivative_rows_are_unique_per_variant() {
    let catalog = FakeCatalog::new();
    let id = catalog.create_image_record(test_image("ab04")).await.unwrap();

    let derivative = NewDerivative {
        variant: DerivativeVariant::Thumb,
        format: "webp".to_string(),
        width: 160,
        height: 223,
        bytes: 4_000,
        storage_path: "derivatives/ab/ab04/thumb.webp".to_string(),
    };

    catalog
        .create_derivative_record(id, derivative.clone())
        .await
        .unwrap();
    let err = catalog
        .create_derivative_record(id, derivative)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::UniqueViolation(_)));
}

#[tokio::test]
async fn assignment_upsert_overwrites_same_card_and_role() {
    let catalog = FakeCatalog::new();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    for image_id in [first, second] {
        catalog
            .assign_image_to_card(Assignment {
                card_id: "c1".to_string(),
                image_id,
                role: PRIMARY_FRONT_ROLE.to_string(),
                source_id: None,
                source_url: None,
            })
            .await
            .unwrap();
    }

    let assignment = catalog.fake_assignment("c1", PRIMARY_FRONT_ROLE).unwrap();
    assert_eq!(assignment.image_id, second);
}

#[tokio::test]
async fn sources_resolve_by_id_and_name() {
    let catalog = FakeCatalog::new();
    catalog.fake_add_source(test_source("s1", "pokemontcg_api"));

    let by_id = catalog.get_image_source("s1").await.unwrap().unwrap();
    assert_eq!(by_id.name, "pokemontcg_api");

    let by_name = catalog
        .get_image_source_by_name("pokemontcg_api")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_name.id, "s1");

    assert!(catalog.get_image_source("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn events_append_in_order() {
    let catalog = FakeCatalog::new();
    catalog
        .log_ingest_event(IngestEvent::for_card("c1", EventType::FetchStarted))
        .await
        .unwrap();
    catalog
        .log_ingest_event(
            IngestEvent::for_card("c1", EventType::FetchFailed)
                .with_message("HTTP 404")
                .with_http_status(404),
        )
        .await
        .unwrap();

    let events = catalog.fake_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_type, EventType::FetchStarted);
    assert_eq!(events[1].message.as_deref(), Some("HTTP 404"));
    assert_eq!(events[1].http_status, Some(404));
}
