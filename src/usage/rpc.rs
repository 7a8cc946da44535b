// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP client for the remote counter procedures
//!
//! The procedures are exposed as RPC endpoints of the database's REST
//! gateway: `POST {base}/rest/v1/rpc/{procedure}` with named arguments in a
//! JSON body, answering with a JSON array of zero or one rows.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::store::CounterService;
use super::types::{CounterError, CounterRow, IncrementRow, ResourceClass, SubjectKey};
use crate::signals::ReducedSignals;

const GET_PROCEDURE: &str = "get_usage_counter";
const INCREMENT_PROCEDURE: &str = "increment_usage_counter";

#[derive(Debug, Serialize)]
struct GetUsageArgs<'a> {
    p_user_id: Option<&'a str>,
    p_anon_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct IncrementArgs<'a> {
    p_user_id: Option<&'a str>,
    p_anon_id: Option<&'a str>,
    p_model_type: &'static str,
    p_ip_prefix: Option<&'a str>,
    p_ua_hash: Option<&'a str>,
    p_fp_hash: Option<&'a str>,
    p_window_seconds: u64,
}

/// Counter service reached over the database REST gateway
pub struct RpcCounterService {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RpcCounterService {
    /// Create a new client
    pub fn new(base_url: &str, service_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        info!("Counter service configured: base_url={}", base_url);

        Ok(Self {
            client,
            base_url,
            service_key: service_key.to_string(),
        })
    }

    fn procedure_url(&self, procedure: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, procedure)
    }

    async fn call<A, R>(&self, procedure: &str, args: &A) -> Result<Vec<R>, CounterError>
    where
        A: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.procedure_url(procedure);
        debug!("Counter service POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(args)
            .send()
            .await
            .map_err(|e| CounterError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(CounterError::Service { status, message });
        }

        response
            .json::<Vec<R>>()
            .await
            .map_err(|e| CounterError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CounterService for RpcCounterService {
    async fn get_usage_counter(
        &self,
        subject: &SubjectKey,
    ) -> Result<Option<CounterRow>, CounterError> {
        let (p_user_id, p_anon_id) = subject.as_wire_pair();
        let rows: Vec<CounterRow> = self
            .call(GET_PROCEDURE, &GetUsageArgs { p_user_id, p_anon_id })
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn increment_usage_counter(
        &self,
        subject: &SubjectKey,
        class: ResourceClass,
        signals: &ReducedSignals,
        window_seconds: u64,
    ) -> Result<IncrementRow, CounterError> {
        let (p_user_id, p_anon_id) = subject.as_wire_pair();
        let args = IncrementArgs {
            p_user_id,
            p_anon_id,
            p_model_type: class.as_str(),
            p_ip_prefix: signals.ip_prefix.as_deref(),
            p_ua_hash: signals.ua_hash.as_deref(),
            p_fp_hash: signals.fp_hash.as_deref(),
            p_window_seconds: window_seconds,
        };
        let rows: Vec<IncrementRow> = self.call(INCREMENT_PROCEDURE, &args).await?;
        rows.into_iter().next().ok_or(CounterError::EmptyResult)
    }

    fn name(&self) -> &'static str {
        "rpc"
    }
}
