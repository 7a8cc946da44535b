// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::quota::Remaining;
use crate::usage::ResourceClass;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    ValidationError {
        field: String,
        message: String,
    },
    QuotaExceeded {
        class: ResourceClass,
        remaining: Remaining,
        reason: String,
    },
    ContentBlocked(String),
    ServiceUnavailable(String),
    UpstreamError(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::QuotaExceeded {
                class,
                remaining,
                reason,
            } => {
                let mut details = HashMap::new();
                details.insert(
                    "modelType".to_string(),
                    serde_json::Value::String(class.to_string()),
                );
                details.insert(
                    "quickRemaining".to_string(),
                    serde_json::Value::Number(remaining.quick_remaining.into()),
                );
                details.insert(
                    "premiumRemaining".to_string(),
                    serde_json::Value::Number(remaining.premium_remaining.into()),
                );
                ("quota_exceeded", reason.clone(), Some(details))
            }
            ApiError::ContentBlocked(msg) => ("content_blocked", msg.clone(), None),
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg.clone(), None),
            ApiError::UpstreamError(msg) => ("upstream_error", msg.clone(), None),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::QuotaExceeded { .. } => 429,
            ApiError::ContentBlocked(_) => 422,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::UpstreamError(_) => 502,
            ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::QuotaExceeded { class, reason, .. } => {
                write!(f, "Quota exceeded for {}: {}", class, reason)
            }
            ApiError::ContentBlocked(msg) => write!(f, "Content blocked: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::UpstreamError(msg) => write!(f, "Upstream error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}
