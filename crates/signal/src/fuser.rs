// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SignalFuser: turns one tick's raw connection/HTTP observations into a single
//! `ActivityIndicator` and decides whether it counts as real activity.

use crate::history::History;
use cctrack_adapters::{ConnScanner, ConnScannerError, HttpClassifier};
use cctrack_core::{ActivityIndicator, Clock, Thresholds, ThresholdsHandle, TrafficPattern};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("connection scan failed: {0}")]
    ConnScan(#[from] ConnScannerError),
}

struct FuserState {
    history: History,
    baseline_connection_count: Option<usize>,
    prev_bytes_delta: u64,
    prev_tracked_count: usize,
}

pub struct SignalFuser {
    conn_scanner: Arc<dyn ConnScanner>,
    classifier: Arc<HttpClassifier>,
    thresholds: ThresholdsHandle,
    clock: Arc<dyn Clock>,
    state: Mutex<FuserState>,
}

impl SignalFuser {
    pub fn new(
        conn_scanner: Arc<dyn ConnScanner>,
        classifier: Arc<HttpClassifier>,
        thresholds: ThresholdsHandle,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let capacity = thresholds.get().history_size;
        Self {
            conn_scanner,
            classifier,
            thresholds,
            clock,
            state: Mutex::new(FuserState {
                history: History::new(capacity),
                baseline_connection_count: None,
                prev_bytes_delta: 0,
                prev_tracked_count: 0,
            }),
        }
    }

    /// Runtime-adjustable thresholds; also resizes the history window immediately.
    pub fn set_thresholds(&self, thresholds: Thresholds) {
        self.thresholds.set(thresholds);
        self.state.lock().history.set_capacity(thresholds.history_size);
    }

    pub fn history_snapshot(&self) -> Vec<ActivityIndicator> {
        self.state.lock().history.snapshot()
    }

    /// Run one tick of the algorithm for the given set of tracked pids.
    pub async fn tick(&self, tracked_pids: &[u32]) -> Result<ActivityIndicator, SignalError> {
        let ts = self.clock.now();

        if tracked_pids.is_empty() {
            let indicator = ActivityIndicator::idle(ts);
            let mut state = self.state.lock();
            state.history.push(indicator.clone());
            state.prev_tracked_count = 0;
            state.prev_bytes_delta = 0;
            return Ok(indicator);
        }

        let conn_snapshot = self.conn_scanner.snapshot(tracked_pids).await?;
        let classifier_snapshot = self.classifier.snapshot_and_reset();
        let thresholds = self.thresholds.get();

        let mut state = self.state.lock();
        let conn_count = conn_snapshot.connections.len();
        if state.baseline_connection_count.is_none() && conn_count > 0 {
            state.baseline_connection_count = Some(conn_count);
        }
        let baseline = state.baseline_connection_count.unwrap_or(conn_count);

        let recent = state.history.last_n(3);
        let variance = connection_count_variance(&recent);
        let sustained = recent.iter().filter(|i| i.is_real_activity).count() >= 2;

        let traffic_pattern = classify_traffic(
            classifier_snapshot.any_http_seen,
            classifier_snapshot.user_interactions,
            conn_count,
            conn_snapshot.bytes_delta,
            state.prev_bytes_delta,
            variance,
            baseline,
            &thresholds,
        );

        let is_real_activity = decide_real_activity(
            traffic_pattern,
            tracked_pids.len(),
            state.prev_tracked_count,
            conn_count,
            baseline,
            conn_snapshot.bytes_delta,
            classifier_snapshot.any_http_seen,
            sustained,
            &thresholds,
        );

        let indicator = ActivityIndicator {
            ts,
            claude_process_count: tracked_pids.len(),
            tcp_conn_count: conn_count,
            bytes_since_last_tick: conn_snapshot.bytes_delta,
            traffic_pattern,
            http_method_counts: classifier_snapshot.method_counts,
            user_interactions: classifier_snapshot.user_interactions,
            background_ops: classifier_snapshot.background_ops,
            http_events_seen: classifier_snapshot.any_http_seen,
            is_real_activity,
        };

        state.history.push(indicator.clone());
        state.prev_bytes_delta = conn_snapshot.bytes_delta;
        state.prev_tracked_count = tracked_pids.len();

        Ok(indicator)
    }
}

/// Population variance of `tcp_conn_count` across the given indicators.
fn connection_count_variance(indicators: &[&ActivityIndicator]) -> f64 {
    if indicators.is_empty() {
        return 0.0;
    }
    let n = indicators.len() as f64;
    let mean = indicators.iter().map(|i| i.tcp_conn_count as f64).sum::<f64>() / n;
    indicators.iter().map(|i| (i.tcp_conn_count as f64 - mean).powi(2)).sum::<f64>() / n
}

#[allow(clippy::too_many_arguments)]
fn classify_traffic(
    http_seen: bool,
    user_interactions: u32,
    conn_count: usize,
    bytes_delta: u64,
    prev_bytes_delta: u64,
    variance: f64,
    baseline: usize,
    thresholds: &Thresholds,
) -> TrafficPattern {
    if http_seen && user_interactions > 0 {
        return TrafficPattern::HttpUser;
    }
    if http_seen {
        return TrafficPattern::HttpBackground;
    }
    if conn_count == 0 || bytes_delta == 0 {
        return TrafficPattern::Idle;
    }
    if bytes_delta as i64 - prev_bytes_delta as i64 > thresholds.burst_bytes as i64 {
        return TrafficPattern::Burst;
    }
    if bytes_delta <= thresholds.keepalive_bytes && variance < 2.0 {
        return TrafficPattern::Keepalive;
    }
    let baseline_diff = (conn_count as i64 - baseline as i64).unsigned_abs() as usize;
    if baseline_diff > 2 && bytes_delta > thresholds.min_active_bytes {
        return TrafficPattern::Interactive;
    }
    if bytes_delta > thresholds.min_active_bytes {
        return TrafficPattern::Interactive;
    }
    TrafficPattern::Keepalive
}

#[allow(clippy::too_many_arguments)]
fn decide_real_activity(
    pattern: TrafficPattern,
    tracked_count: usize,
    prev_tracked_count: usize,
    conn_count: usize,
    baseline: usize,
    bytes_delta: u64,
    http_seen: bool,
    sustained: bool,
    thresholds: &Thresholds,
) -> bool {
    if tracked_count == 0 {
        return false;
    }
    match pattern {
        TrafficPattern::HttpUser | TrafficPattern::Interactive | TrafficPattern::Burst => true,
        TrafficPattern::HttpBackground | TrafficPattern::Idle => false,
        TrafficPattern::Keepalive => {
            let process_jump = tracked_count > prev_tracked_count + 1;
            let conn_above_baseline = conn_count > baseline + 3;
            let bytes_active = bytes_delta > thresholds.min_active_bytes;
            process_jump || conn_above_baseline || bytes_active || sustained
        }
        TrafficPattern::Unknown => {
            if http_seen {
                false
            } else {
                bytes_delta > thresholds.min_active_bytes
            }
        }
    }
}

#[cfg(test)]
#[path = "fuser_tests.rs"]
mod tests;
