// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod generation;
pub mod identity;
pub mod quota;
pub mod signals;
pub mod usage;
pub mod version;

pub use config::NodeConfig;
pub use quota::{QuotaDecision, QuotaEngine};
pub use usage::{ResourceClass, SubjectKey, UsageCounterClient, UsageSnapshot};
