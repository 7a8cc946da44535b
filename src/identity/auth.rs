// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bearer token verification for signed-in callers

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Authentication error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has no subject")]
    MissingSubject,
}

/// Claims read from an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub exp: u64,
}

/// HS256 verifier for access tokens issued by the account service
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Verify a raw token and return the user id it names
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<AccessClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;
        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::MissingSubject);
        }
        Ok(data.claims.sub)
    }

    /// User id from the `Authorization: Bearer` header, if present and valid.
    ///
    /// An invalid token is not an error for the caller: the request simply
    /// proceeds on the anonymous path.
    pub fn user_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        let token = bearer_token(headers)?;
        match self.verify(token) {
            Ok(user_id) => Some(user_id),
            Err(e) => {
                debug!("Ignoring bearer token: {}", e);
                None
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
