// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for usage quotas

use std::env;

use crate::quota::TierLimits;
use crate::usage::MAX_WINDOW_SECONDS;

/// Default rolling window: 24 hours
pub const DEFAULT_WINDOW_SECONDS: u64 = 86_400;

/// Quota limits and window length
#[derive(Debug, Clone)]
pub struct QuotaConfig {
    /// Limits for callers identified only by the `anon_id` cookie
    pub anonymous: TierLimits,
    /// Limits for callers with a verified bearer token
    pub authenticated: TierLimits,
    /// Rolling window length in seconds; also the cookie max-age
    pub window_seconds: u64,
}

impl QuotaConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            anonymous: TierLimits {
                quick_limit: env_u32("ANON_QUICK_LIMIT").unwrap_or(defaults.anonymous.quick_limit),
                premium_limit: env_u32("ANON_PREMIUM_LIMIT")
                    .unwrap_or(defaults.anonymous.premium_limit),
            },
            authenticated: TierLimits {
                quick_limit: env_u32("USER_QUICK_LIMIT")
                    .unwrap_or(defaults.authenticated.quick_limit),
                premium_limit: env_u32("USER_PREMIUM_LIMIT")
                    .unwrap_or(defaults.authenticated.premium_limit),
            },
            window_seconds: env::var("WINDOW_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_WINDOW_SECONDS),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.window_seconds == 0 {
            return Err("Window length must be greater than 0".to_string());
        }
        if self.window_seconds > MAX_WINDOW_SECONDS {
            return Err(format!(
                "Window length must be at most {} seconds",
                MAX_WINDOW_SECONDS
            ));
        }
        Ok(())
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            anonymous: TierLimits {
                quick_limit: 3,
                premium_limit: 1,
            },
            authenticated: TierLimits {
                quick_limit: 20,
                premium_limit: 5,
            },
            window_seconds: DEFAULT_WINDOW_SECONDS,
        }
    }
}

fn env_u32(name: &str) -> Option<u32> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
