// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin HTTP client for the daemon's JSON surface. Deliberately has no dependency
//! on the daemon crate itself — the wire format is the only contract.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon unreachable at {url}: {source}")]
    Connect { url: String, #[source] source: reqwest::Error },
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("daemon returned {status}: {body}")]
    Http { status: u16, body: String },
    #[error("failed to decode daemon response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ClientError {
    /// Whether this failure belongs to the `transient_io` kind and is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Connect { .. } | ClientError::Timeout(_))
            || matches!(self, ClientError::Http { status, .. } if *status >= 500)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionContextDto {
    pub terminal_pid: u32,
    pub shell_pid: u32,
    pub working_dir: String,
    pub project_path: String,
    pub user_id: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStartRequest {
    #[serde(flatten)]
    pub context: SessionContextDto,
    pub command: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionEndRequest {
    #[serde(flatten)]
    pub context: SessionContextDto,
    pub processing_duration_seconds: Option<f64>,
    pub token_count: Option<u64>,
    pub success: Option<bool>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityRequest {
    #[serde(flatten)]
    pub context: SessionContextDto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HookResponse {
    pub session_id: String,
    pub start_time: i64,
    pub estimated_end_time: i64,
    pub block_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionDto {
    pub id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkBlockDto {
    pub id: String,
    pub session_id: String,
    pub start_time: i64,
    pub last_activity: i64,
    pub end_time: Option<i64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkDayDto {
    pub date: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub total_seconds: i64,
    pub session_count: u32,
    pub block_count: u32,
    pub efficiency: f64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusDto {
    pub session: Option<SessionDto>,
    pub active_block: Option<WorkBlockDto>,
    pub last_real_activity: Option<i64>,
    pub uptime_seconds: u64,
}

pub struct DaemonClient {
    base_url: String,
    http: reqwest::Client,
}

impl DaemonClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder().timeout(timeout).build().unwrap_or_default();
        Self { base_url: base_url.into(), http }
    }

    pub async fn session_start(&self, request: &SessionStartRequest) -> Result<HookResponse, ClientError> {
        self.post_json("/api/session/start", request).await
    }

    pub async fn session_end(&self, request: &SessionEndRequest) -> Result<HookResponse, ClientError> {
        self.post_json("/api/session/end", request).await
    }

    pub async fn activity(&self, request: &ActivityRequest) -> Result<HookResponse, ClientError> {
        self.post_json("/api/activity", request).await
    }

    pub async fn status(&self) -> Result<StatusDto, ClientError> {
        self.get_json("/api/v1/status", &[]).await
    }

    pub async fn sessions(
        &self,
        since: Option<i64>,
        until: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<SessionDto>, ClientError> {
        let query = query_pairs(&[
            ("since", since.map(|v| v.to_string())),
            ("until", until.map(|v| v.to_string())),
            ("limit", limit.map(|v| v.to_string())),
        ]);
        self.get_json("/api/v1/sessions", &query).await
    }

    pub async fn work_blocks(
        &self,
        session_id: Option<&str>,
        since: Option<i64>,
        until: Option<i64>,
    ) -> Result<Vec<WorkBlockDto>, ClientError> {
        let query = query_pairs(&[
            ("session_id", session_id.map(str::to_string)),
            ("since", since.map(|v| v.to_string())),
            ("until", until.map(|v| v.to_string())),
        ]);
        self.get_json("/api/v1/work-blocks", &query).await
    }

    pub async fn work_days(&self, since: Option<&str>, until: Option<&str>) -> Result<Vec<WorkDayDto>, ClientError> {
        let query = query_pairs(&[("since", since.map(str::to_string)), ("until", until.map(str::to_string))]);
        self.get_json("/api/v1/work-days", &query).await
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, ClientError>
    where
        Req: Serialize,
        Resp: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.post(&url).json(body).send().await.map_err(|e| connect_error(&url, e))?;
        decode(response).await
    }

    async fn get_json<Resp>(&self, path: &str, query: &[(&str, String)]) -> Result<Resp, ClientError>
    where
        Resp: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.get(&url).query(query).send().await.map_err(|e| connect_error(&url, e))?;
        decode(response).await
    }
}

fn connect_error(url: &str, source: reqwest::Error) -> ClientError {
    if source.is_timeout() {
        ClientError::Timeout(DEFAULT_TIMEOUT)
    } else {
        ClientError::Connect { url: url.to_string(), source }
    }
}

async fn decode<Resp>(response: reqwest::Response) -> Result<Resp, ClientError>
where
    Resp: for<'de> Deserialize<'de>,
{
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Http { status: status.as_u16(), body });
    }
    response.json::<Resp>().await.map_err(ClientError::Decode)
}

fn query_pairs(pairs: &[(&str, Option<String>)]) -> Vec<(&str, String)> {
    pairs.iter().filter_map(|(k, v)| v.clone().map(|v| (*k, v))).collect()
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
