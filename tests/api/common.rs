// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures for router tests

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Rgba, RgbaImage};
use jsonwebtoken::{encode, EncodingKey, Header};
use photo_composite_node::api::{build_router, AppState};
use photo_composite_node::config::QuotaConfig;
use photo_composite_node::generation::{CompositeJob, GenerationOutcome, ImageGenerator};
use photo_composite_node::identity::{AccessClaims, IdentityCookieConfig, TokenVerifier};
use photo_composite_node::quota::QuotaEngine;
use photo_composite_node::usage::{InMemoryCounterService, UsageCounterClient};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tower::util::ServiceExt;

pub const JWT_SECRET: &str = "router-test-secret-0123456789abcdef";

/// What the stub generator answers with
#[derive(Clone)]
pub enum StubBehavior {
    Image,
    SafetyBlocked,
    Fail,
}

pub struct StubGenerator {
    behavior: StubBehavior,
    image: String,
    calls: AtomicUsize,
}

impl StubGenerator {
    pub fn new(behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            image: png_base64(64, 64),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for StubGenerator {
    async fn generate_composite(&self, job: &CompositeJob) -> Result<GenerationOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            StubBehavior::Image => Ok(GenerationOutcome::Image {
                base64_image: self.image.clone(),
                model: format!("stub-{}", job.class),
                processing_time_ms: 12,
            }),
            StubBehavior::SafetyBlocked => Ok(GenerationOutcome::SafetyBlocked {
                reason: "Image rejected by safety system".to_string(),
            }),
            StubBehavior::Fail => Err(anyhow!("upstream returned 500")),
        }
    }

    async fn health_check(&self) -> bool {
        true
    }
}

pub fn png_base64(width: u32, height: u32) -> String {
    let img = RgbaImage::from_pixel(width, height, Rgba([120, 140, 160, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    STANDARD.encode(out.into_inner())
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryCounterService>,
}

pub fn app(generator: Option<Arc<StubGenerator>>) -> TestApp {
    let config = QuotaConfig::default();
    let store = Arc::new(InMemoryCounterService::new());
    let counter = UsageCounterClient::new(
        Some(store.clone()),
        config.window_seconds,
        Duration::from_secs(1),
    );

    let state = AppState {
        quota: QuotaEngine::new(counter, &config),
        generator: generator.map(|g| g as Arc<dyn ImageGenerator>),
        token_verifier: Some(TokenVerifier::new(JWT_SECRET)),
        cookie: IdentityCookieConfig {
            secure: false,
            max_age_secs: config.window_seconds,
        },
        watermark_opacity: 96,
    };

    TestApp {
        router: build_router(state, &["*".to_string()]),
        store,
    }
}

pub fn bearer_token(user_id: &str) -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    let claims = AccessClaims {
        sub: user_id.to_string(),
        exp: now + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn composite_body(model_type: &str) -> String {
    serde_json::json!({
        "photo": png_base64(8, 8),
        "scene": png_base64(16, 16),
        "modelType": model_type,
    })
    .to_string()
}

pub fn composite_request(model_type: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/v1/composite")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.50")
        .header(header::USER_AGENT, "RouterTest/1.0");
    if let Some(id) = cookie {
        builder = builder.header(header::COOKIE, format!("anon_id={}", id));
    }
    builder.body(Body::from(composite_body(model_type))).unwrap()
}

pub fn usage_request(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri("/v1/usage");
    if let Some(id) = cookie {
        builder = builder.header(header::COOKIE, format!("anon_id={}", id));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Value of the `anon_id` cookie set by a response, if any
pub fn issued_identity(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| axum_extra::extract::cookie::Cookie::parse(v.to_string()).ok())
        .find(|c| c.name() == "anon_id")
        .map(|c| c.value().to_string())
}
