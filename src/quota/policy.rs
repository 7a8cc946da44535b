// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pure quota decisions

use serde::{Deserialize, Serialize};

use crate::usage::{ResourceClass, UsageSnapshot};

/// Per-window limits for one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierLimits {
    pub quick_limit: u32,
    pub premium_limit: u32,
}

impl TierLimits {
    pub fn limit_for(&self, class: ResourceClass) -> u32 {
        match class {
            ResourceClass::Quick => self.quick_limit,
            ResourceClass::Premium => self.premium_limit,
        }
    }
}

/// Remaining allowance per class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remaining {
    pub quick_remaining: u32,
    pub premium_remaining: u32,
}

impl Remaining {
    pub fn compute(snapshot: &UsageSnapshot, limits: &TierLimits) -> Self {
        Self {
            quick_remaining: limits.quick_limit.saturating_sub(snapshot.quick_count),
            premium_remaining: limits.premium_limit.saturating_sub(snapshot.premium_count),
        }
    }

    pub fn for_class(&self, class: ResourceClass) -> u32 {
        match class {
            ResourceClass::Quick => self.quick_remaining,
            ResourceClass::Premium => self.premium_remaining,
        }
    }
}

/// Eligibility of one subject for one resource class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaDecision {
    pub can_generate: bool,
    pub quick_remaining: u32,
    pub premium_remaining: u32,
    /// Human-readable explanation; not used for control flow
    pub reason: String,
}

impl QuotaDecision {
    pub fn remaining(&self) -> Remaining {
        Remaining {
            quick_remaining: self.quick_remaining,
            premium_remaining: self.premium_remaining,
        }
    }
}

/// Decide whether `class` may be consumed given current usage.
///
/// Both remainders are always reported, whichever class was requested.
pub fn decide(snapshot: &UsageSnapshot, class: ResourceClass, limits: &TierLimits) -> QuotaDecision {
    let remaining = Remaining::compute(snapshot, limits);
    let left = remaining.for_class(class);

    QuotaDecision {
        can_generate: left > 0,
        quick_remaining: remaining.quick_remaining,
        premium_remaining: remaining.premium_remaining,
        reason: reason_for(class, left),
    }
}

fn reason_for(class: ResourceClass, left: u32) -> String {
    let (label, title) = match class {
        ResourceClass::Quick => ("quick", "Quick"),
        ResourceClass::Premium => ("premium", "Premium"),
    };
    match left {
        0 => format!("{} generation limit reached", title),
        1 => format!("1 {} generation remaining", label),
        n => format!("{} {} generations remaining", n, label),
    }
}
