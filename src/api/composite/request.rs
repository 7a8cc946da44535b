// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Composite request types and validation

use serde::{Deserialize, Serialize};

use crate::usage::ResourceClass;

/// Maximum length of a base64 image field (~10MB decoded)
pub const MAX_IMAGE_BASE64_LEN: usize = 14 * 1024 * 1024;

fn default_model_type() -> String {
    "quick".to_string()
}

/// Request for POST /v1/composite
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeRequest {
    /// Base64-encoded user photo
    pub photo: String,

    /// Base64-encoded stock scene
    pub scene: String,

    /// Resource class: "quick" or "premium"
    #[serde(default = "default_model_type")]
    pub model_type: String,
}

impl CompositeRequest {
    /// Validate the request and return the requested resource class.
    ///
    /// Errors are `(field, message)`.
    pub fn validate(&self) -> Result<ResourceClass, (&'static str, String)> {
        for (field, value) in [("photo", &self.photo), ("scene", &self.scene)] {
            if value.trim().is_empty() {
                return Err((field, format!("{} must not be empty", field)));
            }
            if value.len() > MAX_IMAGE_BASE64_LEN {
                return Err((
                    field,
                    format!(
                        "{} is too large: {} bytes (max: {} bytes)",
                        field,
                        value.len(),
                        MAX_IMAGE_BASE64_LEN
                    ),
                ));
            }
        }

        self.model_type
            .parse::<ResourceClass>()
            .map_err(|e| ("modelType", e))
    }
}
