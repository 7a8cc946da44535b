// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Signal extraction from requests and irreversible reduction

use axum::http::{HeaderMap, HeaderValue};
use photo_composite_node::signals::{
    extract_signals, hash_signal, ip_prefix, reduce, ReducedSignals, FINGERPRINT_HEADER,
    SIGNAL_HASH_LEN,
};
use std::net::SocketAddr;

#[test]
fn test_ip_prefix_v4_and_v6() {
    assert_eq!(ip_prefix("192.168.1.37").as_deref(), Some("192.168.1.0"));
    assert_eq!(
        ip_prefix("2001:db8:1:2:3:4:5:6").as_deref(),
        Some("2001:db8:1:2::")
    );
    assert_eq!(ip_prefix("::ffff:10.1.2.3").as_deref(), Some("10.1.2.0"));
    assert_eq!(ip_prefix(" 8.8.4.4 ").as_deref(), Some("8.8.4.0"));
}

#[test]
fn test_unparseable_ip_passes_through() {
    assert_eq!(ip_prefix("unknown").as_deref(), Some("unknown"));
    assert_eq!(ip_prefix("").as_deref(), None);
}

#[test]
fn test_hashes_are_truncated_and_stable() {
    let a = hash_signal(Some("Mozilla/5.0")).unwrap();
    let b = hash_signal(Some("Mozilla/5.0")).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), SIGNAL_HASH_LEN);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_ne!(a, hash_signal(Some("Mozilla/5.1")).unwrap());
    assert!(hash_signal(Some("")).is_none());
}

#[test]
fn test_reduced_signals_never_contain_raw_values() {
    let reduced = reduce(
        Some("203.0.113.77"),
        Some("SecretBrowser/9.9"),
        Some("device-abc"),
    );
    let json = serde_json::to_string(&reduced).unwrap();
    assert!(!json.contains("203.0.113.77"));
    assert!(!json.contains("SecretBrowser"));
    assert!(!json.contains("device-abc"));
}

#[test]
fn test_forwarded_for_preferred_over_peer() {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_static("198.51.100.4, 10.0.0.1"),
    );
    headers.insert("user-agent", HeaderValue::from_static("Agent/1"));
    headers.insert(FINGERPRINT_HEADER, HeaderValue::from_static("fp"));
    let peer: SocketAddr = "10.9.9.9:5555".parse().unwrap();

    let raw = extract_signals(&headers, Some(peer));
    assert_eq!(raw.ip_address.as_deref(), Some("198.51.100.4"));
    assert_eq!(raw.user_agent.as_deref(), Some("Agent/1"));
    assert_eq!(raw.fingerprint.as_deref(), Some("fp"));

    let reduced = raw.reduce();
    assert_eq!(reduced.ip_prefix.as_deref(), Some("198.51.100.0"));
    assert_eq!(reduced.fp_hash, hash_signal(Some("fp")));
}

#[test]
fn test_peer_address_used_without_proxy_headers() {
    let peer: SocketAddr = "[2001:db8::1]:443".parse().unwrap();
    let raw = extract_signals(&HeaderMap::new(), Some(peer));
    assert_eq!(raw.ip_address.as_deref(), Some("2001:db8::1"));
    assert!(raw.user_agent.is_none());

    let none = extract_signals(&HeaderMap::new(), None);
    assert!(none.ip_address.is_none());
    assert_eq!(none.reduce(), ReducedSignals::default());
}
