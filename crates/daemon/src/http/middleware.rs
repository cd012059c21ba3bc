// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-cutting HTTP middleware, applied rate-limit → logging → metrics, closest to
//! the router last (so metrics sees every request that made it past rate-limiting).

use crate::state::AppState;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let decision = state.rate_limiter.check(remote.ip());
    if !decision.allowed {
        let mut response =
            (StatusCode::TOO_MANY_REQUESTS, axum::Json(json!({"error": "rate_limit_exceeded"}))).into_response();
        let headers = response.headers_mut();
        headers.insert("X-RateLimit-Limit", header_value_from_u32(decision.limit));
        headers.insert("X-RateLimit-Remaining", header_value_from_u32(decision.remaining));
        headers.insert("Retry-After", header_value_from_u32(decision.retry_after_secs));
        return response;
    }
    next.run(request).await
}

pub async fn record_metrics(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    state.metrics.record_request();
    next.run(request).await
}

fn header_value_from_u32(value: u32) -> HeaderValue {
    HeaderValue::from_str(&value.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0"))
}
