// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! GET /v1/usage and GET /health

use super::common::{
    app, bearer_token, composite_request, issued_identity, json_body, send, usage_request,
    StubBehavior, StubGenerator,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};

const VISITOR: &str = "1e4d7c2b-8a9f-4b3c-a2d1-5f6e7d8c9b0a";

#[tokio::test]
async fn test_fresh_visitor_sees_full_allowance() {
    let test = app(None);

    let response = send(&test.router, usage_request(None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(issued_identity(&response).is_some());

    let body = json_body(response).await;
    assert_eq!(body["subject"], "anonymous");
    assert_eq!(body["quickRemaining"], 3);
    assert_eq!(body["premiumRemaining"], 1);
    assert_eq!(body["quickLimit"], 3);
    assert_eq!(body["premiumLimit"], 1);
    assert_eq!(body["windowSeconds"], 86_400);
    assert!(body.get("windowStartedAt").is_none());
    assert!(body.get("windowResetsAt").is_none());
}

#[tokio::test]
async fn test_usage_reflects_recorded_generations() {
    let test = app(Some(StubGenerator::new(StubBehavior::Image)));

    send(&test.router, composite_request("premium", Some(VISITOR))).await;
    send(&test.router, composite_request("quick", Some(VISITOR))).await;

    let response = send(&test.router, usage_request(Some(VISITOR))).await;
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = json_body(response).await;
    assert_eq!(body["quickRemaining"], 2);
    assert_eq!(body["premiumRemaining"], 0);

    let started = chrono::DateTime::parse_from_rfc3339(body["windowStartedAt"].as_str().unwrap())
        .unwrap();
    let resets = chrono::DateTime::parse_from_rfc3339(body["windowResetsAt"].as_str().unwrap())
        .unwrap();
    assert_eq!((resets - started).num_seconds(), 86_400);
}

#[tokio::test]
async fn test_reading_usage_does_not_consume_quota() {
    let test = app(None);

    for _ in 0..5 {
        send(&test.router, usage_request(Some(VISITOR))).await;
    }
    let body = json_body(send(&test.router, usage_request(Some(VISITOR))).await).await;
    assert_eq!(body["quickRemaining"], 3);
}

#[tokio::test]
async fn test_signed_in_usage_reports_authenticated_tier() {
    let test = app(None);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/v1/usage")
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", bearer_token("user-5")),
        )
        .body(Body::empty())
        .unwrap();
    let response = send(&test.router, request).await;
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let body = json_body(response).await;
    assert_eq!(body["subject"], "authenticated");
    assert_eq!(body["quickLimit"], 20);
    assert_eq!(body["premiumLimit"], 5);
}

#[tokio::test]
async fn test_health_reports_dependencies() {
    let healthy = app(Some(StubGenerator::new(StubBehavior::Image)));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let body = json_body(send(&healthy.router, request).await).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["counterService"], "memory");
    assert_eq!(body["generator"], true);
    assert!(body["version"].is_string());

    let degraded = app(None);
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let body = json_body(send(&degraded.router, request).await).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["generator"], false);
}
