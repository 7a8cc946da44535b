// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Client for the external generative-image API (image edit endpoint)

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::usage::ResourceClass;

/// Error codes the image API uses for a safety refusal
const SAFETY_BLOCK_CODES: &[&str] = &["safety_blocked", "content_policy_violation"];

/// One composite job: a user photo placed into a stock scene
#[derive(Debug, Clone)]
pub struct CompositeJob {
    /// Base64-encoded user photo
    pub photo: String,
    /// Base64-encoded stock scene
    pub scene: String,
    pub class: ResourceClass,
}

/// Result of a generation call
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Image {
        base64_image: String,
        model: String,
        processing_time_ms: u64,
    },
    /// The API refused the input or output on safety grounds
    SafetyBlocked { reason: String },
}

/// The external image generation step
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_composite(&self, job: &CompositeJob) -> Result<GenerationOutcome>;

    /// Check if the upstream API is reachable
    async fn health_check(&self) -> bool;
}

// --- OpenAI-compatible response types ---

#[derive(Debug, Deserialize)]
pub struct ImageEditResponse {
    pub data: Vec<ImageEditData>,
}

#[derive(Debug, Deserialize)]
pub struct ImageEditData {
    pub b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// HTTP client for an OpenAI-compatible image edit API
pub struct CompositeClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    quick_model: String,
    premium_model: String,
    prompt: String,
}

impl CompositeClient {
    /// Create a new CompositeClient
    pub fn new(endpoint: &str, config: &GeneratorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "Composite client configured: endpoint={}, quick_model={}, premium_model={}",
            endpoint, config.quick_model, config.premium_model
        );

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            quick_model: config.quick_model.clone(),
            premium_model: config.premium_model.clone(),
            prompt: config.prompt.clone(),
        })
    }

    /// Model used for a resource class
    pub fn model_for(&self, class: ResourceClass) -> &str {
        match class {
            ResourceClass::Quick => &self.quick_model,
            ResourceClass::Premium => &self.premium_model,
        }
    }

    fn request_body(&self, job: &CompositeJob) -> serde_json::Value {
        serde_json::json!({
            "model": self.model_for(job.class),
            "prompt": self.prompt,
            "images": [job.photo, job.scene],
            "n": 1,
            "response_format": "b64_json",
        })
    }
}

#[async_trait]
impl ImageGenerator for CompositeClient {
    async fn generate_composite(&self, job: &CompositeJob) -> Result<GenerationOutcome> {
        let start = std::time::Instant::now();
        let model = self.model_for(job.class).to_string();

        let url = format!("{}/v1/images/edits", self.endpoint);
        debug!("Composite generate POST {} (model={})", url, model);

        let mut request = self.client.post(&url).json(&self.request_body(job));
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if let Some(reason) = safety_block_reason(&text) {
                return Ok(GenerationOutcome::SafetyBlocked { reason });
            }
            return Err(anyhow::anyhow!(
                "image API returned {}: {}",
                status,
                text
            ));
        }

        let api_response: ImageEditResponse = response.json().await?;
        let first = api_response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("empty response from image API"))?;

        // A success without image data is how the API signals a filtered output
        let Some(base64_image) = first.b64_json else {
            return Ok(GenerationOutcome::SafetyBlocked {
                reason: "Output withheld by the image API safety filter".to_string(),
            });
        };

        Ok(GenerationOutcome::Image {
            base64_image,
            model,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.endpoint))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("Image API health check failed: {}", e);
                false
            }
        }
    }
}

/// Reason string if an error body is a safety refusal
pub fn safety_block_reason(body: &str) -> Option<String> {
    let envelope: ApiErrorEnvelope = serde_json::from_str(body).ok()?;
    let code = envelope.error.code?;
    if !SAFETY_BLOCK_CODES.contains(&code.as_str()) {
        return None;
    }
    Some(
        envelope
            .error
            .message
            .unwrap_or_else(|| "Request blocked by safety filter".to_string()),
    )
}
