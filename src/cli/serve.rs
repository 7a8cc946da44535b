// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Args;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{start_server, AppState};
use crate::config::{CounterBackend, NodeConfig};
use crate::generation::{CompositeClient, ImageGenerator};
use crate::identity::{IdentityCookieConfig, TokenVerifier};
use crate::quota::QuotaEngine;
use crate::usage::{CounterService, InMemoryCounterService, RpcCounterService, UsageCounterClient};
use crate::version;

/// Arguments for the serve command
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to listen on (overrides LISTEN_ADDR)
    #[arg(long)]
    pub listen: Option<String>,
}

/// Run the HTTP server until it fails
pub async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = NodeConfig::from_env();
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }
    config.validate().map_err(anyhow::Error::msg)?;

    info!("Starting {}", version::get_version_string());

    let state = build_state(&config)?;
    if let Some(generator) = &state.generator {
        if !generator.health_check().await {
            warn!("Image generation endpoint is not reachable yet");
        }
    }

    start_server(
        state,
        &config.server.listen_addr,
        &config.server.cors_allowed_origins,
    )
    .await
}

/// Wire configuration into handler state
pub fn build_state(config: &NodeConfig) -> Result<AppState> {
    let service: Option<Arc<dyn CounterService>> = match config.counter.backend {
        CounterBackend::Memory => {
            warn!("Using in-memory counter service; usage is lost on restart");
            Some(Arc::new(InMemoryCounterService::new()))
        }
        CounterBackend::Rpc => match (&config.counter.url, &config.counter.service_key) {
            (Some(url), Some(key)) => Some(Arc::new(RpcCounterService::new(
                url,
                key,
                config.counter.timeout(),
            )?)),
            _ => None,
        },
    };

    let counter = UsageCounterClient::new(
        service,
        config.quota.window_seconds,
        config.counter.timeout(),
    );
    let quota = QuotaEngine::new(counter, &config.quota);

    let generator: Option<Arc<dyn ImageGenerator>> = match &config.generator.endpoint {
        Some(endpoint) => Some(Arc::new(CompositeClient::new(endpoint, &config.generator)?)),
        None => {
            warn!("GENERATOR_ENDPOINT not set; composite requests will return 503");
            None
        }
    };

    let token_verifier = config.server.jwt_secret.as_deref().map(TokenVerifier::new);
    if token_verifier.is_none() {
        info!("JWT_SECRET not set; all callers are treated as anonymous");
    }

    Ok(AppState {
        quota,
        generator,
        token_verifier,
        cookie: IdentityCookieConfig {
            secure: config.server.production,
            max_age_secs: config.quota.window_seconds,
        },
        watermark_opacity: config.generator.watermark_opacity,
    })
}
