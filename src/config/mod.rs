// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Environment-driven configuration

pub mod quota;
pub mod server;
pub mod services;

pub use quota::{QuotaConfig, DEFAULT_WINDOW_SECONDS};
pub use server::ServerConfig;
pub use services::{CounterBackend, CounterServiceConfig, GeneratorConfig};

/// Complete node configuration
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    pub server: ServerConfig,
    pub quota: QuotaConfig,
    pub counter: CounterServiceConfig,
    pub generator: GeneratorConfig,
}

impl NodeConfig {
    /// Load every section from environment variables
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            quota: QuotaConfig::from_env(),
            counter: CounterServiceConfig::from_env(),
            generator: GeneratorConfig::from_env(),
        }
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.quota.validate()?;
        self.counter.validate()?;
        self.generator.validate()?;
        Ok(())
    }
}
