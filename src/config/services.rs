// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for external services: the counter store and the image API

use std::env;
use std::time::Duration;

/// Which counter service implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterBackend {
    /// Remote atomic procedures over the database REST gateway
    Rpc,
    /// Single-process store (development only)
    Memory,
}

/// Counter service connection settings
#[derive(Debug, Clone)]
pub struct CounterServiceConfig {
    pub backend: CounterBackend,
    /// Base URL of the REST gateway; `None` leaves the service unconfigured
    pub url: Option<String>,
    /// Service key sent as `apikey` and bearer token
    pub service_key: Option<String>,
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

impl CounterServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            backend: match env::var("COUNTER_BACKEND")
                .map(|v| v.to_lowercase())
                .as_deref()
            {
                Ok("memory") => CounterBackend::Memory,
                _ => CounterBackend::Rpc,
            },
            url: non_empty_env("COUNTER_SERVICE_URL"),
            service_key: non_empty_env("COUNTER_SERVICE_KEY"),
            timeout_ms: env::var("COUNTER_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }

    /// True when the RPC backend has both a URL and a key
    pub fn is_rpc_configured(&self) -> bool {
        self.url.is_some() && self.service_key.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("Counter service timeout must be greater than 0".to_string());
        }
        if let Some(ref url) = self.url {
            url::Url::parse(url).map_err(|e| format!("invalid COUNTER_SERVICE_URL: {}", e))?;
        }
        let partially_set = self.url.is_some() || self.service_key.is_some();
        if self.backend == CounterBackend::Rpc && partially_set && !self.is_rpc_configured() {
            return Err(
                "COUNTER_SERVICE_URL and COUNTER_SERVICE_KEY must be set together".to_string(),
            );
        }
        Ok(())
    }
}

impl Default for CounterServiceConfig {
    fn default() -> Self {
        Self {
            backend: CounterBackend::Rpc,
            url: None,
            service_key: None,
            timeout_ms: 3000,
        }
    }
}

/// External image API settings
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Base URL of the image API; `None` disables generation
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    /// Model used for quick generations
    pub quick_model: String,
    /// Model used for premium generations
    pub premium_model: String,
    /// Instruction sent with every composite request
    pub prompt: String,
    /// Alpha of the watermark stamped on anonymous results (0 disables)
    pub watermark_opacity: u8,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeneratorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: non_empty_env("GENERATOR_ENDPOINT"),
            api_key: non_empty_env("GENERATOR_API_KEY"),
            quick_model: non_empty_env("QUICK_MODEL").unwrap_or(defaults.quick_model),
            premium_model: non_empty_env("PREMIUM_MODEL").unwrap_or(defaults.premium_model),
            prompt: non_empty_env("COMPOSITE_PROMPT").unwrap_or(defaults.prompt),
            watermark_opacity: env::var("WATERMARK_OPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.watermark_opacity),
            timeout_secs: env::var("GENERATOR_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref endpoint) = self.endpoint {
            url::Url::parse(endpoint).map_err(|e| format!("invalid GENERATOR_ENDPOINT: {}", e))?;
        }
        if self.prompt.trim().is_empty() {
            return Err("Composite prompt must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("Generator timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            quick_model: "composite-fast".to_string(),
            premium_model: "composite-hd".to_string(),
            prompt: "Place the person from the first image naturally into the scene of the second image, matching lighting and perspective.".to_string(),
            watermark_opacity: 96,
            timeout_secs: 120,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
