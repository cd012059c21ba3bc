// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `HookEndpoint`: the three shell-hook-facing routes.

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cctrack_core::SessionContext;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SessionStartRequest {
    #[serde(flatten)]
    pub context: SessionContext,
    pub command: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct SessionEndRequest {
    #[serde(flatten)]
    pub context: SessionContext,
    pub processing_duration_seconds: Option<f64>,
    pub token_count: Option<u64>,
    pub success: Option<bool>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    #[serde(flatten)]
    pub context: SessionContext,
}

#[derive(Debug, Serialize)]
pub struct HookResponse {
    pub session_id: String,
    pub start_time: i64,
    pub estimated_end_time: i64,
    pub block_id: Option<String>,
}

pub async fn session_start(State(state): State<Arc<AppState>>, Json(req): Json<SessionStartRequest>) -> Response {
    if let Err(error) = req.context.validate(state.clock.now()) {
        return invalid_input(&error);
    }

    let outcome = state.fsm.observe(req.context.timestamp, true);
    tracing::info!(command = ?req.command, "session/start hook");
    respond_with_current_session(&state, outcome.block_id.map(|id| id.as_str().to_string()))
}

pub async fn session_end(State(state): State<Arc<AppState>>, Json(req): Json<SessionEndRequest>) -> Response {
    if let Err(error) = req.context.validate(state.clock.now()) {
        return invalid_input(&error);
    }

    let outcome = state.fsm.observe(req.context.timestamp, true);
    // Metadata only — the FSM's own timestamps remain authoritative for duration.
    tracing::info!(
        processing_duration_seconds = req.processing_duration_seconds,
        token_count = req.token_count,
        success = req.success,
        error_message = ?req.error_message,
        "session/end hook"
    );
    respond_with_current_session(&state, outcome.block_id.map(|id| id.as_str().to_string()))
}

pub async fn activity(State(state): State<Arc<AppState>>, Json(req): Json<ActivityRequest>) -> Response {
    if let Err(error) = req.context.validate(state.clock.now()) {
        return invalid_input(&error);
    }

    let outcome = state.fsm.observe(req.context.timestamp, true);
    respond_with_current_session(&state, outcome.block_id.map(|id| id.as_str().to_string()))
}

fn respond_with_current_session(state: &AppState, block_id: Option<String>) -> Response {
    match state.fsm.current_session() {
        Some(session) => (
            StatusCode::OK,
            Json(HookResponse {
                session_id: session.id.as_str().to_string(),
                start_time: session.start_time,
                estimated_end_time: session.end_time,
                block_id,
            }),
        )
            .into_response(),
        None => not_ready(),
    }
}

fn invalid_input(error: &cctrack_core::SessionContextError) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_input", "message": error.to_string()}))).into_response()
}

fn not_ready() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": "not_ready", "message": "session state unavailable"})))
        .into_response()
}

#[cfg(test)]
#[path = "hook_tests.rs"]
mod tests;
