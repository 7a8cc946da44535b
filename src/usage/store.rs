// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Counter service trait definition

use async_trait::async_trait;

use super::types::{CounterError, CounterRow, IncrementRow, ResourceClass, SubjectKey};
use crate::signals::ReducedSignals;

/// The external atomic-counter service.
///
/// Implementations must perform the window rollover check and the increment
/// of `increment_usage_counter` as one atomic operation per subject. Callers
/// never read a row, modify it, and write it back.
#[async_trait]
pub trait CounterService: Send + Sync {
    /// Read the subject's row, if any. Must not mutate state.
    async fn get_usage_counter(&self, subject: &SubjectKey)
        -> Result<Option<CounterRow>, CounterError>;

    /// Atomically roll the window over if expired, increment the counter for
    /// `class`, and overwrite the stored signals.
    async fn increment_usage_counter(
        &self,
        subject: &SubjectKey,
        class: ResourceClass,
        signals: &ReducedSignals,
        window_seconds: u64,
    ) -> Result<IncrementRow, CounterError>;

    /// Backend name for logging and health output
    fn name(&self) -> &'static str;
}
