// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's JSON HTTP surface: shell-hook routes plus a read-only admin surface.

mod admin;
mod hook;
mod middleware;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/session/start", post(hook::session_start))
        .route("/api/session/end", post(hook::session_end))
        .route("/api/activity", post(hook::activity))
        .route("/api/v1/status", get(admin::status))
        .route("/api/v1/sessions", get(admin::sessions))
        .route("/api/v1/work-blocks", get(admin::work_blocks))
        .route("/api/v1/work-days", get(admin::work_days))
        .route("/api/v1/metrics", get(admin::metrics))
        .route("/health", get(admin::health))
        .route("/ready", get(admin::ready))
        .layer(axum::middleware::from_fn_with_state(Arc::clone(&state), middleware::record_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(Arc::clone(&state), middleware::rate_limit))
        .with_state(state)
}
