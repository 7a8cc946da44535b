// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Caller identification: anonymous cookie identities and bearer tokens

pub mod auth;
pub mod issuer;

pub use auth::{AccessClaims, AuthError, TokenVerifier};
pub use issuer::{
    identity_cookie, is_valid_identifier, resolve_identity, AnonymousIdentity,
    IdentityCookieConfig, ANON_COOKIE_NAME,
};
