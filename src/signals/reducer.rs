// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Reduction of raw client metadata into coarse abuse signals
//!
//! Raw IPs, user-agents and device fingerprints never leave this module:
//! the IP is truncated to its network prefix and the other two values are
//! replaced by a truncated one-way digest.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Length of a reduced hash in hex characters
pub const SIGNAL_HASH_LEN: usize = 32;

/// Raw, request-scoped client metadata
#[derive(Debug, Clone, Default)]
pub struct AbuseSignals {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub fingerprint: Option<String>,
}

impl AbuseSignals {
    pub fn reduce(&self) -> ReducedSignals {
        reduce(
            self.ip_address.as_deref(),
            self.user_agent.as_deref(),
            self.fingerprint.as_deref(),
        )
    }
}

/// Signals safe to persist alongside a counter row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducedSignals {
    pub ip_prefix: Option<String>,
    pub ua_hash: Option<String>,
    pub fp_hash: Option<String>,
}

/// Reduce raw metadata into persistable signals
pub fn reduce(
    ip_address: Option<&str>,
    user_agent: Option<&str>,
    fingerprint: Option<&str>,
) -> ReducedSignals {
    ReducedSignals {
        ip_prefix: ip_address.and_then(ip_prefix),
        ua_hash: hash_signal(user_agent),
        fp_hash: hash_signal(fingerprint),
    }
}

/// Truncate an address to its network prefix.
///
/// IPv4 keeps the /24, IPv6 keeps the /64. IPv4-mapped IPv6 addresses are
/// reduced as IPv4. Values that do not parse as an address are returned
/// unchanged.
pub fn ip_prefix(ip: &str) -> Option<String> {
    let trimmed = ip.trim();
    if trimmed.is_empty() {
        return None;
    }

    let prefix = match trimmed.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4_prefix(v4),
        Ok(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => v4_prefix(v4),
            None => v6_prefix(v6),
        },
        Err(_) => trimmed.to_string(),
    };
    Some(prefix)
}

fn v4_prefix(addr: Ipv4Addr) -> String {
    let [a, b, c, _] = addr.octets();
    Ipv4Addr::new(a, b, c, 0).to_string()
}

fn v6_prefix(addr: Ipv6Addr) -> String {
    let mask = !0u128 << 64;
    Ipv6Addr::from(u128::from(addr) & mask).to_string()
}

/// SHA-256 of the value, hex encoded and truncated to [`SIGNAL_HASH_LEN`].
///
/// Absent and empty values map to `None` and are never hashed.
pub fn hash_signal(value: Option<&str>) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    let digest = Sha256::digest(value.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(SIGNAL_HASH_LEN);
    Some(encoded)
}
