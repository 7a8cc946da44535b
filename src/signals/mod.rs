// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Abuse signals: extraction from requests and irreversible reduction

pub mod extract;
pub mod reducer;

pub use extract::{extract_signals, FINGERPRINT_HEADER};
pub use reducer::{hash_signal, ip_prefix, reduce, AbuseSignals, ReducedSignals, SIGNAL_HASH_LEN};
