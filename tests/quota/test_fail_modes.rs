// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Counter service outages: reads fail open, writes fail closed

use async_trait::async_trait;
use photo_composite_node::config::QuotaConfig;
use photo_composite_node::quota::QuotaEngine;
use photo_composite_node::signals::ReducedSignals;
use photo_composite_node::usage::{
    CounterError, CounterRow, CounterService, IncrementRow, ResourceClass, RpcCounterService,
    SubjectKey, UsageCounterClient, UsageSnapshot,
};
use std::sync::Arc;
use std::time::Duration;

/// Service that answers correctly, but only after `delay`
struct SlowCounterService {
    delay: Duration,
}

#[async_trait]
impl CounterService for SlowCounterService {
    async fn get_usage_counter(
        &self,
        _subject: &SubjectKey,
    ) -> Result<Option<CounterRow>, CounterError> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(CounterRow {
            quick_count: 3,
            premium_count: 1,
            window_started_at: Some(chrono::Utc::now()),
        }))
    }

    async fn increment_usage_counter(
        &self,
        _subject: &SubjectKey,
        _class: ResourceClass,
        _signals: &ReducedSignals,
        _window_seconds: u64,
    ) -> Result<IncrementRow, CounterError> {
        tokio::time::sleep(self.delay).await;
        Ok(IncrementRow {
            new_quick: 4,
            new_premium: 1,
            window_started_at: chrono::Utc::now(),
        })
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

fn anon() -> SubjectKey {
    SubjectKey::Anonymous("0b6f4f57-2c1c-4d8a-9a55-3c1f0c4b8e21".to_string())
}

fn unreachable_client() -> UsageCounterClient {
    let service = RpcCounterService::new(
        "http://127.0.0.1:59999",
        "service-key",
        Duration::from_secs(2),
    )
    .unwrap();
    UsageCounterClient::new(Some(Arc::new(service)), 86_400, Duration::from_secs(2))
}

#[tokio::test]
async fn test_unreachable_service_reads_as_zero_usage() {
    let client = unreachable_client();
    assert_eq!(client.fetch_usage(&anon()).await, UsageSnapshot::default());
}

#[tokio::test]
async fn test_unreachable_service_allows_generation() {
    let engine = QuotaEngine::new(unreachable_client(), &QuotaConfig::default());
    let decision = engine.can_generate(&anon(), ResourceClass::Premium).await;
    assert!(decision.can_generate);
    assert_eq!(decision.quick_remaining, 3);
    assert_eq!(decision.premium_remaining, 1);
}

#[tokio::test]
async fn test_unreachable_service_does_not_count() {
    let client = unreachable_client();
    let outcome = client
        .bump_usage(&anon(), ResourceClass::Quick, &ReducedSignals::default())
        .await;
    assert!(!outcome.success);
    assert!(outcome.window_started_at.is_none());
}

#[tokio::test]
async fn test_slow_read_times_out_to_zero() {
    let service = Arc::new(SlowCounterService {
        delay: Duration::from_millis(500),
    });
    let client = UsageCounterClient::new(Some(service), 86_400, Duration::from_millis(20));
    assert_eq!(client.fetch_usage(&anon()).await, UsageSnapshot::default());
}

#[tokio::test]
async fn test_slow_increment_times_out_as_failure() {
    let service = Arc::new(SlowCounterService {
        delay: Duration::from_millis(500),
    });
    let client = UsageCounterClient::new(Some(service), 86_400, Duration::from_millis(20));
    let outcome = client
        .bump_usage(&anon(), ResourceClass::Quick, &ReducedSignals::default())
        .await;
    assert!(!outcome.success);
}

#[tokio::test]
async fn test_slow_service_within_timeout_succeeds() {
    let service = Arc::new(SlowCounterService {
        delay: Duration::from_millis(5),
    });
    let client = UsageCounterClient::new(Some(service), 86_400, Duration::from_secs(2));

    let snapshot = client.fetch_usage(&anon()).await;
    assert_eq!(snapshot.quick_count, 3);

    let outcome = client
        .bump_usage(&anon(), ResourceClass::Quick, &ReducedSignals::default())
        .await;
    assert!(outcome.success);
    assert_eq!(outcome.new_quick_count, 4);
}

#[tokio::test]
async fn test_unconfigured_client_fails_open_then_closed() {
    let client = UsageCounterClient::unconfigured(86_400);
    assert!(!client.is_configured());
    assert_eq!(client.backend_name(), "none");
    assert_eq!(client.fetch_usage(&anon()).await, UsageSnapshot::default());

    let outcome = client
        .bump_usage(&anon(), ResourceClass::Premium, &ReducedSignals::default())
        .await;
    assert!(!outcome.success);
}
