// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transient per-tick activity signal produced by the signal layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classification of the traffic observed in a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficPattern {
    Idle,
    Keepalive,
    Interactive,
    Burst,
    HttpUser,
    HttpBackground,
    Unknown,
}

/// HTTP method bucket used for classification. `Other` covers TRACE/CONNECT/etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Head,
    Options,
    Delete,
    Other,
}

impl HttpMethod {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "DELETE" => Self::Delete,
            _ => Self::Other,
        }
    }

    /// POST/PUT/PATCH count as a user interaction; everything else is background.
    pub fn is_user_interaction(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

/// One tick's worth of fused activity signal, kept as a short rolling history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityIndicator {
    pub ts: i64,
    pub claude_process_count: usize,
    pub tcp_conn_count: usize,
    pub bytes_since_last_tick: u64,
    pub traffic_pattern: TrafficPattern,
    pub http_method_counts: HashMap<HttpMethod, u32>,
    pub user_interactions: u32,
    pub background_ops: u32,
    pub http_events_seen: bool,
    pub is_real_activity: bool,
}

impl ActivityIndicator {
    /// An indicator for a tick where no tracked processes were found.
    pub fn idle(ts: i64) -> Self {
        Self {
            ts,
            claude_process_count: 0,
            tcp_conn_count: 0,
            bytes_since_last_tick: 0,
            traffic_pattern: TrafficPattern::Idle,
            http_method_counts: HashMap::new(),
            user_interactions: 0,
            background_ops: 0,
            http_events_seen: false,
            is_real_activity: false,
        }
    }
}
