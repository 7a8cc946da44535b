// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Usage counter client
//!
//! Wraps the counter service with the failure policy of the quota system:
//! reads fail open (zero usage), writes fail closed (`success = false`).
//! Errors are logged and never retried here.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::store::CounterService;
use super::types::{
    BumpOutcome, CounterError, CounterRow, ResourceClass, SubjectKey, UsageSnapshot,
    MAX_WINDOW_SECONDS,
};
use crate::signals::ReducedSignals;

/// Client over an optional counter service
#[derive(Clone)]
pub struct UsageCounterClient {
    service: Option<Arc<dyn CounterService>>,
    window_seconds: u64,
    call_timeout: Duration,
}

impl UsageCounterClient {
    pub fn new(
        service: Option<Arc<dyn CounterService>>,
        window_seconds: u64,
        call_timeout: Duration,
    ) -> Self {
        if service.is_none() {
            warn!("Counter service not configured: usage reads report zero, increments are not recorded");
        }
        Self {
            service,
            window_seconds,
            call_timeout,
        }
    }

    /// Client with no backing service
    pub fn unconfigured(window_seconds: u64) -> Self {
        Self::new(None, window_seconds, Duration::from_secs(3))
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_some()
    }

    pub fn backend_name(&self) -> &'static str {
        self.service.as_ref().map(|s| s.name()).unwrap_or("none")
    }

    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    /// Current usage for a subject. Never mutates state.
    ///
    /// An unreachable or unconfigured service, or a row whose window has
    /// expired, yields the zero snapshot.
    pub async fn fetch_usage(&self, subject: &SubjectKey) -> UsageSnapshot {
        let Some(service) = self.service.as_ref() else {
            return UsageSnapshot::default();
        };

        match self.with_timeout(service.get_usage_counter(subject)).await {
            Ok(Some(row)) => self.snapshot_from_row(row, Utc::now()),
            Ok(None) => UsageSnapshot::default(),
            Err(e) => {
                warn!(
                    "Usage read failed for {}, treating as zero usage: {}",
                    subject.redacted(),
                    e
                );
                UsageSnapshot::default()
            }
        }
    }

    /// Atomically record one generation of `class` for a subject.
    ///
    /// The increment and window rollover run as one server-side operation.
    /// Any failure, including a timeout, reports `success = false` and the
    /// generation must be treated as not counted.
    pub async fn bump_usage(
        &self,
        subject: &SubjectKey,
        class: ResourceClass,
        signals: &ReducedSignals,
    ) -> BumpOutcome {
        let Some(service) = self.service.as_ref() else {
            warn!(
                "Usage increment skipped for {}: counter service not configured",
                subject.redacted()
            );
            return BumpOutcome::failed();
        };

        let call = service.increment_usage_counter(subject, class, signals, self.window_seconds);
        match self.with_timeout(call).await {
            Ok(row) => {
                debug!(
                    "Usage recorded for {}: quick={}, premium={}",
                    subject.redacted(),
                    row.new_quick,
                    row.new_premium
                );
                BumpOutcome {
                    success: true,
                    new_quick_count: row.new_quick,
                    new_premium_count: row.new_premium,
                    window_started_at: Some(row.window_started_at),
                }
            }
            Err(e) => {
                warn!(
                    "Usage increment failed for {} ({}): {}",
                    subject.redacted(),
                    class,
                    e
                );
                BumpOutcome::failed()
            }
        }
    }

    fn snapshot_from_row(&self, row: CounterRow, now: DateTime<Utc>) -> UsageSnapshot {
        match row.window_started_at {
            Some(started) if window_expired(started, now, self.window_seconds) => {
                UsageSnapshot::default()
            }
            started => UsageSnapshot {
                quick_count: row.quick_count,
                premium_count: row.premium_count,
                window_started_at: started,
            },
        }
    }

    async fn with_timeout<T, F>(&self, call: F) -> Result<T, CounterError>
    where
        F: Future<Output = Result<T, CounterError>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CounterError::Timeout {
                timeout_ms: self.call_timeout.as_millis() as u64,
            }),
        }
    }
}

/// `now - started >= window`
pub fn window_expired(started: DateTime<Utc>, now: DateTime<Utc>, window_seconds: u64) -> bool {
    let window = ChronoDuration::seconds(window_seconds.min(MAX_WINDOW_SECONDS) as i64);
    now.signed_duration_since(started) >= window
}
