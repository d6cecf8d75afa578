use bytes::Bytes;

use crate::fetch::{fetch_image, FakeFetcher, FetchError, RawResponse};

const MAX_BYTES: usize = 10 * 1024 * 1024;

fn image_response(body: &[u8]) -> RawResponse {
    RawResponse {
        status: 200,
        content_type: Some("image/jpeg".to_string()),
        body: Bytes::copy_from_slice(body),
    }
}

#[tokio::test]
async fn successful_fetch_returns_bytes_and_content_type() {
    let fetcher = FakeFetcher::new();
    fetcher.fake_add_image("http://x/a.jpg", "image/jpeg", vec![1, 2, 3]);

    let fetched = fetch_image(&fetcher, "http://x/a.jpg", None, MAX_BYTES)
        .await
        .unwrap();
    assert_eq!(fetched.bytes.as_ref(), &[1, 2, 3]);
    assert_eq!(fetched.content_type, "image/jpeg");
    assert_eq!(fetched.http_status, 200);
    assert_eq!(fetcher.fake_requests(), vec!["http://x/a.jpg".to_string()]);
}

#[tokio::test]
async fn network_failure_propagates_message() {
    let fetcher = FakeFetcher::new();
    fetcher.fake_fail_with("connection reset by peer");

    let err = fetch_image(&fetcher, "http://x/a.jpg", None, MAX_BYTES)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
    assert_eq!(err.to_string(), "connection reset by peer");
    assert_eq!(err.http_status(), None);
}

#[tokio::test]
async fn non_2xx_status_is_reported_with_code() {
    let fetcher = FakeFetcher::new();
    fetcher.fake_add_response(
        "http://x/a.jpg",
        RawResponse {
            status: 404,
            content_type: Some("image/jpeg".to_string()),
            body: Bytes::new(),
        },
    );

    let err = fetch_image(&fetcher, "http://x/a.jpg", None, MAX_BYTES)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP 404");
    assert_eq!(err.http_status(), Some(404));
}

#[tokio::test]
async fn non_image_content_type_is_rejected() {
    let fetcher = FakeFetcher::new();
    fetcher.fake_add_response(
        "http://x/a.jpg",
        RawResponse {
            status: 200,
            content_type: Some("text/html".to_string()),
            body: Bytes::from_static(b"<html>"),
        },
    );

    let err = fetch_image(&fetcher, "http://x/a.jpg", None, MAX_BYTES)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid content type: text/html");
}

#[tokio::test]
async fn missing_content_type_is_rejected() {
    let fetcher = FakeFetcher::new();
    fetcher.fake_add_response(
        "http://x/a.jpg",
        RawResponse {
            status: 200,
            content_type: None,
            body: Bytes::from_static(b"data"),
        },
    );

    let err = fetch_image(&fetcher, "http://x/a.jpg", None, MAX_BYTES)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidContentType(_)));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let fetcher = FakeFetcher::new();
    fetcher.fake_add_response("http://x/a.jpg", image_response(&[0_u8; 2048]));

    let err = fetch_image(&fetcher, "http://x/a.jpg", None, 1024)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::TooLarge { size: 2048, max: 1024 }));
}

#[tokio::test]
async fn known_error_payload_length_is_rejected_for_named_source() {
    let fetcher = FakeFetcher::new();
    fetcher.fake_add_response("http://x/a.jpg", image_response(&vec![0_u8; 186_316]));

    let err = fetch_image(&fetcher, "http://x/a.jpg", Some("pokemontcg_api"), MAX_BYTES)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::KnownErrorPayload));
    assert_eq!(err.to_string(), "known_error_payload");
}

#[tokio::test]
async fn known_error_payload_length_passes_for_other_sources() {
    let fetcher = FakeFetcher::new();
    fetcher.fake_add_response("http://x/a.jpg", image_response(&vec![0_u8; 186_316]));

    let fetched = fetch_image(&fetcher, "http://x/a.jpg", Some("other_source"), MAX_BYTES)
        .await
        .unwrap();
    assert_eq!(fetched.bytes.len(), 186_316);
}
