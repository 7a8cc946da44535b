// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Quota policy: pure decisions and the engine that applies them

pub mod engine;
pub mod policy;

pub use engine::QuotaEngine;
pub use policy::{decide, QuotaDecision, Remaining, TierLimits};
