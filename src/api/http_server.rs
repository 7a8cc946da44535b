// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use super::composite::{composite_handler, MAX_IMAGE_BASE64_LEN};
use super::usage::{health_handler, usage_handler};
use crate::generation::ImageGenerator;
use crate::identity::{IdentityCookieConfig, TokenVerifier};
use crate::quota::QuotaEngine;
use crate::signals::FINGERPRINT_HEADER;

/// Request body limit: two base64 images plus JSON framing
const MAX_BODY_BYTES: usize = 2 * MAX_IMAGE_BASE64_LEN + 64 * 1024;

/// Shared handler state.
///
/// Holds no per-subject data; usage lives in the counter service.
#[derive(Clone)]
pub struct AppState {
    pub quota: QuotaEngine,
    /// `None` when no generation endpoint is configured (503)
    pub generator: Option<Arc<dyn ImageGenerator>>,
    /// `None` when no JWT secret is configured; every caller is anonymous
    pub token_verifier: Option<TokenVerifier>,
    pub cookie: IdentityCookieConfig,
    /// Watermark opacity for anonymous results (0 disables)
    pub watermark_opacity: u8,
}

/// Build the router with all routes and layers
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/usage", get(usage_handler))
        .route("/v1/composite", post(composite_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = if allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(AllowOrigin::mirror_request())
    } else {
        let mut origins = Vec::new();
        for origin in allowed_origins {
            match HeaderValue::from_str(origin) {
                Ok(value) => origins.push(value),
                Err(_) => tracing::warn!(origin, "Invalid CORS origin in config; skipping"),
            }
        }
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    // Credentials are required for the identity cookie
    layer
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static(FINGERPRINT_HEADER),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

pub async fn start_server(
    state: AppState,
    listen_addr: &str,
    allowed_origins: &[String],
) -> anyhow::Result<()> {
    let app = build_router(state, allowed_origins);

    let addr = listen_addr.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
