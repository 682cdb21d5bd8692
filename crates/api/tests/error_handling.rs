//! Authentication failures must reject before any state is read or
//! written; these tests run against a router whose database is
//! unreachable, so a rejection that touched the pool would fail loudly.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn error_code(response: axum::response::Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    json["code"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn jobs_require_a_bearer_token() {
    let app = common::build_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/jobs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() {
    let app = common::build_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/jobs")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn callback_with_wrong_worker_secret_has_no_effect() {
    let app = common::build_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/jobs/00000000-0000-0000-0000-000000000000/callback")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-worker-secret", "wrong-secret")
                .body(Body::from(r#"{"status":"RUNNING","progressPct":10}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "UNAUTHORIZED");
}

#[tokio::test]
async fn callback_without_secret_header_is_rejected() {
    let app = common::build_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/jobs/00000000-0000-0000-0000-000000000000/callback")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"SUCCEEDED","outputKey":"out.mp4"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
