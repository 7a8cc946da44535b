// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Composite response types

use serde::{Deserialize, Serialize};

use crate::quota::Remaining;
use crate::usage::ResourceClass;

/// Response from POST /v1/composite
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeResponse {
    /// Base64-encoded result image
    pub image: String,
    pub model_type: ResourceClass,
    /// Upstream model that produced the image
    pub model: String,
    pub processing_time_ms: u64,
    /// Whether the usage counter recorded this generation
    pub counted: bool,
    /// Whether a watermark was applied
    pub watermarked: bool,
    pub quota: Remaining,
}
