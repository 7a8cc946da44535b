// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Composite endpoint handler

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use std::net::SocketAddr;
use tracing::{debug, info, warn};

use super::request::CompositeRequest;
use super::response::CompositeResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::subject::resolve_subject;
use crate::generation::{apply_watermark, CompositeJob, GenerationOutcome};
use crate::signals::{extract_signals, ReducedSignals};
use crate::usage::SubjectKey;

/// POST /v1/composite - Composite a user photo into a stock scene
///
/// Pipeline:
/// 1. Resolve the subject (bearer token, `anon_id` cookie, or a new identity)
/// 2. Validate request
/// 3. Quota check (429 if exhausted)
/// 4. Get the generator from AppState (503 if absent)
/// 5. Generate (422 on safety block, 502 on failure)
/// 6. Watermark anonymous results (500 if the image cannot be processed)
/// 7. Record the generation with reduced abuse signals
pub async fn composite_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<CompositeRequest>, JsonRejection>,
) -> Response {
    let (subject, jar) = resolve_subject(&state, &headers, jar);
    let signals = extract_signals(&headers, peer.map(|ConnectInfo(addr)| addr)).reduce();

    let result = run_composite(&state, &subject, &signals, payload).await;
    (jar, result.map(Json)).into_response()
}

async fn run_composite(
    state: &AppState,
    subject: &SubjectKey,
    signals: &ReducedSignals,
    payload: Result<Json<CompositeRequest>, JsonRejection>,
) -> Result<CompositeResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let class = request.validate().map_err(|(field, message)| {
        warn!("Composite validation failed: {}: {}", field, message);
        ApiError::ValidationError {
            field: field.to_string(),
            message,
        }
    })?;

    debug!(
        "Composite request from {}: class={}, photo_len={}, scene_len={}",
        subject.redacted(),
        class,
        request.photo.len(),
        request.scene.len()
    );

    let decision = state.quota.can_generate(subject, class).await;
    if !decision.can_generate {
        info!(
            "Quota exhausted for {}: {} (limit {})",
            subject.redacted(),
            decision.reason,
            state.quota.limits_for(subject).limit_for(class)
        );
        return Err(ApiError::QuotaExceeded {
            class,
            remaining: decision.remaining(),
            reason: decision.reason,
        });
    }

    let generator = state.generator.as_ref().ok_or_else(|| {
        warn!("Image generator not configured");
        ApiError::ServiceUnavailable("Image generation service not available".to_string())
    })?;

    let job = CompositeJob {
        photo: request.photo,
        scene: request.scene,
        class,
    };

    let outcome = generator.generate_composite(&job).await.map_err(|e| {
        warn!("Composite generation failed: {}", e);
        ApiError::UpstreamError(format!("Image generation failed: {}", e))
    })?;

    let (image, model, processing_time_ms) = match outcome {
        GenerationOutcome::Image {
            base64_image,
            model,
            processing_time_ms,
        } => (base64_image, model, processing_time_ms),
        GenerationOutcome::SafetyBlocked { reason } => {
            info!("Composite blocked by safety filter for {}", subject.redacted());
            return Err(ApiError::ContentBlocked(reason));
        }
    };

    let watermarked = !subject.is_authenticated() && state.watermark_opacity > 0;
    let image = if watermarked {
        apply_watermark(&image, state.watermark_opacity).map_err(|e| {
            warn!("Watermarking failed: {}", e);
            ApiError::InternalError(format!("Generated image could not be processed: {}", e))
        })?
    } else {
        image
    };

    let bump = state.quota.record_generation(subject, class, signals).await;
    let quota = if bump.success {
        state.quota.remaining_after(subject, &bump)
    } else {
        warn!(
            "Generation for {} delivered but not counted",
            subject.redacted()
        );
        decision.remaining()
    };

    info!(
        "Composite generated: class={}, model={}, {}ms, counted={}",
        class, model, processing_time_ms, bump.success
    );

    Ok(CompositeResponse {
        image,
        model_type: class,
        model,
        processing_time_ms,
        counted: bump.success,
        watermarked,
        quota,
    })
}
