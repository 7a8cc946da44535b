// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Quota engine: tier selection over the usage counter client

use tracing::debug;

use super::policy::{decide, QuotaDecision, Remaining, TierLimits};
use crate::config::QuotaConfig;
use crate::signals::ReducedSignals;
use crate::usage::{BumpOutcome, ResourceClass, SubjectKey, UsageCounterClient, UsageSnapshot};

/// Gates generations against per-tier limits.
///
/// Holds no mutable state: all usage lives in the counter service.
#[derive(Clone)]
pub struct QuotaEngine {
    counter: UsageCounterClient,
    anonymous: TierLimits,
    authenticated: TierLimits,
}

impl QuotaEngine {
    pub fn new(counter: UsageCounterClient, config: &QuotaConfig) -> Self {
        Self {
            counter,
            anonymous: config.anonymous,
            authenticated: config.authenticated,
        }
    }

    pub fn counter(&self) -> &UsageCounterClient {
        &self.counter
    }

    /// Limits that apply to a subject
    pub fn limits_for(&self, subject: &SubjectKey) -> TierLimits {
        if subject.is_authenticated() {
            self.authenticated
        } else {
            self.anonymous
        }
    }

    /// Current usage of a subject, as the counter client reports it
    pub async fn usage(&self, subject: &SubjectKey) -> UsageSnapshot {
        self.counter.fetch_usage(subject).await
    }

    /// Whether `subject` may consume one `class` generation.
    ///
    /// Read-only: checking never consumes quota.
    pub async fn can_generate(&self, subject: &SubjectKey, class: ResourceClass) -> QuotaDecision {
        let snapshot = self.counter.fetch_usage(subject).await;
        let decision = decide(&snapshot, class, &self.limits_for(subject));
        debug!(
            "Quota check for {} ({}): allowed={}, {}",
            subject.redacted(),
            class,
            decision.can_generate,
            decision.reason
        );
        decision
    }

    /// Record a generation that actually succeeded
    pub async fn record_generation(
        &self,
        subject: &SubjectKey,
        class: ResourceClass,
        signals: &ReducedSignals,
    ) -> BumpOutcome {
        self.counter.bump_usage(subject, class, signals).await
    }

    /// Remaining allowance implied by a successful increment
    pub fn remaining_after(&self, subject: &SubjectKey, outcome: &BumpOutcome) -> Remaining {
        Remaining::compute(&outcome.as_snapshot(), &self.limits_for(subject))
    }
}
