// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for usage accounting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound applied to window lengths (ten years)
pub const MAX_WINDOW_SECONDS: u64 = 10 * 365 * 86_400;

/// The two metered resource classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceClass {
    Quick,
    Premium,
}

impl ResourceClass {
    /// Wire tag sent to the counter procedures
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceClass::Quick => "quick",
            ResourceClass::Premium => "premium",
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quick" => Ok(ResourceClass::Quick),
            "premium" => Ok(ResourceClass::Premium),
            other => Err(format!(
                "invalid model type '{}'; allowed: quick, premium",
                other
            )),
        }
    }
}

/// Who a counter row belongs to.
///
/// Exactly one of the two keys is ever set on the wire; modelling it as an
/// enum keeps callers from passing both or neither.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubjectKey {
    Anonymous(String),
    Authenticated(String),
}

impl SubjectKey {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SubjectKey::Authenticated(_))
    }

    /// `(user_id, anon_id)` pair in the counter service's calling convention
    pub fn as_wire_pair(&self) -> (Option<&str>, Option<&str>) {
        match self {
            SubjectKey::Anonymous(id) => (None, Some(id.as_str())),
            SubjectKey::Authenticated(id) => (Some(id.as_str()), None),
        }
    }

    /// Short form safe for logs
    pub fn redacted(&self) -> String {
        let (kind, id) = match self {
            SubjectKey::Anonymous(id) => ("anon", id),
            SubjectKey::Authenticated(id) => ("user", id),
        };
        let head: String = id.chars().take(8).collect();
        format!("{}:{}…", kind, head)
    }
}

/// A counter row as stored by the counter service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterRow {
    pub quick_count: u32,
    pub premium_count: u32,
    pub window_started_at: Option<DateTime<Utc>>,
}

/// Result row of the atomic increment procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncrementRow {
    pub new_quick: u32,
    pub new_premium: u32,
    pub window_started_at: DateTime<Utc>,
}

/// Client-side view of a subject's usage in the current window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub quick_count: u32,
    pub premium_count: u32,
    pub window_started_at: Option<DateTime<Utc>>,
}

/// Outcome of `bump_usage`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BumpOutcome {
    pub success: bool,
    pub new_quick_count: u32,
    pub new_premium_count: u32,
    pub window_started_at: Option<DateTime<Utc>>,
}

impl BumpOutcome {
    pub fn failed() -> Self {
        Self::default()
    }

    pub fn as_snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            quick_count: self.new_quick_count,
            premium_count: self.new_premium_count,
            window_started_at: self.window_started_at,
        }
    }
}

/// Errors raised by counter service implementations
#[derive(Debug, Error)]
pub enum CounterError {
    #[error("counter service transport error: {0}")]
    Transport(String),

    #[error("counter service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("failed to decode counter service response: {0}")]
    Decode(String),

    #[error("increment procedure returned no row")]
    EmptyResult,

    #[error("counter service call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}
