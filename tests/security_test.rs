mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::DateTime;
use common::*;
use http_body_util::BodyExt;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let test = TestApp::new(MockStorageService::failing_lists());

    let response = test.app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok(), "{timestamp}");
    assert!(timestamp.ends_with('Z'));
}

#[tokio::test]
async fn test_security_headers_present() {
    let test = TestApp::new(MockStorageService::new());

    let response = test.app.clone().oneshot(get("/health")).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
    assert_eq!(headers["referrer-policy"], "no-referrer");
    assert!(headers.contains_key("content-security-policy"));
    assert!(headers.contains_key("strict-transport-security"));
    assert!(!headers.contains_key("x-powered-by"));
}

#[tokio::test]
async fn test_request_id_round_trip() {
    let test = TestApp::new(MockStorageService::new());

    let response = test.app.clone().oneshot(get("/health")).await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert!(!generated.is_empty());

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_trace_method_rejected() {
    let test = TestApp::new(MockStorageService::new());

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("TRACE")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let test = TestApp::new(MockStorageService::new());

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/images")
                .header("Origin", "https://elsewhere.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_landing_page_served() {
    let test = TestApp::new(MockStorageService::new());

    let response = test.app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&body).contains("Image Upload"));
}
