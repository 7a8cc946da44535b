// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Resolution of the calling subject for a request

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::http_server::AppState;
use crate::identity::{identity_cookie, resolve_identity, ANON_COOKIE_NAME};
use crate::usage::SubjectKey;

/// Resolve who is calling.
///
/// A valid bearer token wins; otherwise the `anon_id` cookie is reused or a
/// fresh identity is minted. The returned jar carries the new cookie only
/// when one was issued.
pub fn resolve_subject(state: &AppState, headers: &HeaderMap, jar: CookieJar) -> (SubjectKey, CookieJar) {
    if let Some(user_id) = state
        .token_verifier
        .as_ref()
        .and_then(|verifier| verifier.user_from_headers(headers))
    {
        return (SubjectKey::Authenticated(user_id), jar);
    }

    let carried = jar.get(ANON_COOKIE_NAME).map(|c| c.value().to_string());
    let (identity, is_new) = resolve_identity(carried.as_deref());
    if !is_new {
        return (SubjectKey::Anonymous(identity.into_string()), jar);
    }

    debug!("Issuing new anonymous identity");
    let cookie = identity_cookie(&identity, &state.cookie);
    (SubjectKey::Anonymous(identity.into_string()), jar.add(cookie))
}
