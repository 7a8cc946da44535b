// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Anonymous identity issuance and the `anon_id` cookie

use axum_extra::extract::cookie::{Cookie, SameSite};
use uuid::{Uuid, Variant, Version};

/// Name of the cookie carrying the anonymous identifier
pub const ANON_COOKIE_NAME: &str = "anon_id";

/// Stable anonymous identifier for one browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymousIdentity {
    id: String,
}

impl AnonymousIdentity {
    fn mint() -> Self {
        Self {
            id: Uuid::new_v4().hyphenated().to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn into_string(self) -> String {
        self.id
    }
}

/// Attributes of the identity cookie
#[derive(Debug, Clone)]
pub struct IdentityCookieConfig {
    /// Send only over HTTPS (production)
    pub secure: bool,
    /// Cookie lifetime, equal to the usage window
    pub max_age_secs: u64,
}

/// Reuse a well-formed carried identifier, or mint a new one.
///
/// Returns the identity and whether it was newly issued. Never fails: any
/// malformed value is silently replaced.
pub fn resolve_identity(carried: Option<&str>) -> (AnonymousIdentity, bool) {
    match carried {
        Some(value) if is_valid_identifier(value) => (
            AnonymousIdentity {
                id: value.to_string(),
            },
            false,
        ),
        _ => (AnonymousIdentity::mint(), true),
    }
}

/// Hyphenated, version-4, RFC 4122 variant UUID text
pub fn is_valid_identifier(value: &str) -> bool {
    // try_parse also accepts simple, braced and urn forms
    if value.len() != 36 {
        return false;
    }
    match Uuid::try_parse(value) {
        Ok(uuid) => {
            uuid.get_version() == Some(Version::Random) && uuid.get_variant() == Variant::RFC4122
        }
        Err(_) => false,
    }
}

/// Build the cookie that carries a newly issued identity
pub fn identity_cookie(identity: &AnonymousIdentity, config: &IdentityCookieConfig) -> Cookie<'static> {
    let max_age = time::Duration::seconds(i64::try_from(config.max_age_secs).unwrap_or(i64::MAX));
    Cookie::build((ANON_COOKIE_NAME, identity.as_str().to_string()))
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .path("/")
        .build()
}
