// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction of raw client metadata from request headers

use axum::http::HeaderMap;
use std::net::SocketAddr;

use super::reducer::AbuseSignals;

/// Header carrying the client-computed device fingerprint
pub const FINGERPRINT_HEADER: &str = "x-device-fingerprint";

/// Collect the raw signals for one request.
///
/// The client IP is taken from the first `X-Forwarded-For` entry, then
/// `X-Real-IP`, then the peer address of the connection.
pub fn extract_signals(headers: &HeaderMap, peer: Option<SocketAddr>) -> AbuseSignals {
    AbuseSignals {
        ip_address: client_ip(headers, peer),
        user_agent: header_value(headers, "user-agent"),
        fingerprint: header_value(headers, FINGERPRINT_HEADER),
    }
}

fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| header_value(headers, "x-real-ip"))
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
