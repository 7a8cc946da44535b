// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Usage accounting over the external atomic-counter service

pub mod client;
pub mod memory;
pub mod rpc;
pub mod store;
pub mod types;

pub use client::{window_expired, UsageCounterClient};
pub use memory::InMemoryCounterService;
pub use rpc::RpcCounterService;
pub use store::CounterService;
pub use types::{
    BumpOutcome, CounterError, CounterRow, IncrementRow, ResourceClass, SubjectKey,
    UsageSnapshot, MAX_WINDOW_SECONDS,
};
