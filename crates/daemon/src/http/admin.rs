// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only operational surface: status, listings, health/readiness, metrics.

use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cctrack_core::{Session, WorkBlock, WorkDay};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 1000;

#[derive(Debug, Deserialize, Default)]
pub struct RangeQuery {
    pub since: Option<i64>,
    pub until: Option<i64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct WorkBlockQuery {
    pub session_id: Option<String>,
    pub since: Option<i64>,
    pub until: Option<i64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct WorkDayQuery {
    pub since: Option<String>,
    pub until: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub session: Option<Session>,
    pub active_block: Option<WorkBlock>,
    pub last_real_activity: Option<i64>,
    pub uptime_seconds: u64,
}

pub async fn status(State(state): State<Arc<AppState>>) -> Response {
    match state.fsm.consistent_snapshot() {
        Ok((session, active_block)) => (
            StatusCode::OK,
            Json(StatusResponse {
                session,
                active_block,
                last_real_activity: state.fsm.last_real_activity(),
                uptime_seconds: state.metrics.snapshot().uptime_seconds,
            }),
        )
            .into_response(),
        Err(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "inconsistent_state", "message": error.to_string()})),
        )
            .into_response(),
    }
}

pub async fn sessions(State(state): State<Arc<AppState>>, Query(query): Query<RangeQuery>) -> Response {
    let limit = clamp_limit(query.limit);
    match state.store.list_sessions(query.since, query.until, limit, query.offset.unwrap_or(0)) {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(error) => store_error(error),
    }
}

pub async fn work_blocks(State(state): State<Arc<AppState>>, Query(query): Query<WorkBlockQuery>) -> Response {
    let limit = clamp_limit(query.limit);
    match state.store.list_work_blocks(
        query.session_id.as_deref(),
        query.since,
        query.until,
        limit,
        query.offset.unwrap_or(0),
    ) {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(error) => store_error(error),
    }
}

pub async fn work_days(State(state): State<Arc<AppState>>, Query(query): Query<WorkDayQuery>) -> Response {
    match state.store.list_work_days(query.since.as_deref(), query.until.as_deref()) {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(error) => store_error(error),
    }
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    (StatusCode::OK, Json(state.metrics.snapshot())).into_response()
}

pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    if let Err(error) = state.fsm.consistent_snapshot() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "unhealthy", "check": "fsm_consistency", "message": error.to_string()})),
        )
            .into_response();
    }
    if let Err(error) = state.store.list_work_days(None, None) {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "unhealthy", "check": "store_reachable", "message": error.to_string()})),
        )
            .into_response();
    }
    (StatusCode::OK, Json(json!({"status": "healthy"}))).into_response()
}

pub async fn ready(State(state): State<Arc<AppState>>) -> Response {
    if state.is_ready() {
        (StatusCode::OK, Json(json!({"status": "ready"}))).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"status": "starting"}))).into_response()
    }
}

fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

fn store_error(error: cctrack_storage::StoreError) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "store_error", "message": error.to_string()})))
        .into_response()
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
