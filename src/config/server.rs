// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server configuration

use std::env;

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// `APP_ENV=production` marks the identity cookie `Secure`
    pub production: bool,
    /// HS256 secret for bearer tokens; `None` treats every caller as anonymous
    pub jwt_secret: Option<String>,
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            listen_addr: env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            production: env::var("APP_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            jwt_secret: env::var("JWT_SECRET").ok().filter(|v| !v.is_empty()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| vec!["*".to_string()]),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.listen_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|e| format!("invalid listen address '{}': {}", self.listen_addr, e))?;
        if self.production && self.jwt_secret.as_deref().map_or(false, |s| s.len() < 32) {
            return Err("JWT secret must be at least 32 bytes in production".to_string());
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            production: false,
            jwt_secret: None,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}
