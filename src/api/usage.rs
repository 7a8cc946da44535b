// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Usage and health endpoints

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

use super::http_server::AppState;
use super::subject::resolve_subject;
use crate::quota::Remaining;
use crate::usage::MAX_WINDOW_SECONDS;
use crate::version;

/// Response from GET /v1/usage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    /// "anonymous" or "authenticated"
    pub subject: String,
    pub quick_remaining: u32,
    pub premium_remaining: u32,
    pub quick_limit: u32,
    pub premium_limit: u32,
    pub window_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_resets_at: Option<DateTime<Utc>>,
}

/// Response from GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// Counter backend name, or "none"
    pub counter_service: String,
    pub generator: bool,
    pub version: String,
}

/// GET /v1/usage - Remaining allowance for the caller
pub async fn usage_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    let (subject, jar) = resolve_subject(&state, &headers, jar);
    let snapshot = state.quota.usage(&subject).await;
    let limits = state.quota.limits_for(&subject);
    let remaining = Remaining::compute(&snapshot, &limits);
    let window_seconds = state.quota.counter().window_seconds();

    let window_resets_at = snapshot.window_started_at.and_then(|started| {
        started.checked_add_signed(ChronoDuration::seconds(
            window_seconds.min(MAX_WINDOW_SECONDS) as i64,
        ))
    });

    let response = UsageResponse {
        subject: if subject.is_authenticated() {
            "authenticated".to_string()
        } else {
            "anonymous".to_string()
        },
        quick_remaining: remaining.quick_remaining,
        premium_remaining: remaining.premium_remaining,
        quick_limit: limits.quick_limit,
        premium_limit: limits.premium_limit,
        window_seconds,
        window_started_at: snapshot.window_started_at,
        window_resets_at,
    };

    (jar, Json(response)).into_response()
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let counter = state.quota.counter();
    let status = if counter.is_configured() && state.generator.is_some() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        counter_service: counter.backend_name().to_string(),
        generator: state.generator.is_some(),
        version: version::VERSION_NUMBER.to_string(),
    })
}
