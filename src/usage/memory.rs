// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-process counter service for development and tests.
//!
//! Mirrors the semantics of the remote procedures: every increment performs
//! the rollover check and the increment inside one critical section. It is
//! only correct within a single process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::client::window_expired;
use super::store::CounterService;
use super::types::{CounterError, CounterRow, IncrementRow, ResourceClass, SubjectKey};
use crate::signals::ReducedSignals;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone)]
struct StoredCounter {
    quick_count: u32,
    premium_count: u32,
    window_started_at: DateTime<Utc>,
    /// Window length passed with the latest increment
    window_seconds: u64,
    signals: ReducedSignals,
}

/// Single-process implementation of the counter procedures
pub struct InMemoryCounterService {
    rows: Mutex<HashMap<SubjectKey, StoredCounter>>,
    clock: Clock,
}

impl InMemoryCounterService {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Create a service reading time from `clock` (for testing)
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Last signals recorded for a subject
    pub async fn signals_for(&self, subject: &SubjectKey) -> Option<ReducedSignals> {
        self.rows
            .lock()
            .await
            .get(subject)
            .map(|row| row.signals.clone())
    }
}

impl Default for InMemoryCounterService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterService for InMemoryCounterService {
    async fn get_usage_counter(
        &self,
        subject: &SubjectKey,
    ) -> Result<Option<CounterRow>, CounterError> {
        let now = (self.clock)();
        let rows = self.rows.lock().await;
        // A lapsed window reads as absent; the next increment restarts it
        Ok(rows
            .get(subject)
            .filter(|row| !window_expired(row.window_started_at, now, row.window_seconds))
            .map(|row| CounterRow {
                quick_count: row.quick_count,
                premium_count: row.premium_count,
                window_started_at: Some(row.window_started_at),
            }))
    }

    async fn increment_usage_counter(
        &self,
        subject: &SubjectKey,
        class: ResourceClass,
        signals: &ReducedSignals,
        window_seconds: u64,
    ) -> Result<IncrementRow, CounterError> {
        let now = (self.clock)();

        let mut rows = self.rows.lock().await;
        let row = rows.entry(subject.clone()).or_insert_with(|| StoredCounter {
            quick_count: 0,
            premium_count: 0,
            window_started_at: now,
            window_seconds,
            signals: ReducedSignals::default(),
        });

        if window_expired(row.window_started_at, now, window_seconds) {
            row.quick_count = 0;
            row.premium_count = 0;
            row.window_started_at = now;
        }

        match class {
            ResourceClass::Quick => row.quick_count = row.quick_count.saturating_add(1),
            ResourceClass::Premium => row.premium_count = row.premium_count.saturating_add(1),
        }
        row.window_seconds = window_seconds;
        row.signals = signals.clone();

        Ok(IncrementRow {
            new_quick: row.quick_count,
            new_premium: row.premium_count,
            window_started_at: row.window_started_at,
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
