// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process counters exposed over `/api/v1/metrics`. No external scraper is
//! assumed; this is a plain JSON snapshot consumed by the report CLI and `/health`.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug)]
pub struct MetricsRegistry {
    started_at: Instant,
    ticks_processed: AtomicU64,
    dropped_notifications: AtomicU64,
    store_errors: AtomicU64,
    consistency_failures: AtomicU64,
    requests_total: AtomicU64,
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub ticks_processed: u64,
    pub dropped_notifications: u64,
    pub store_errors: u64,
    pub consistency_failures: u64,
    pub requests_total: u64,
    pub uptime_seconds: u64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            ticks_processed: AtomicU64::new(0),
            dropped_notifications: AtomicU64::new(0),
            store_errors: AtomicU64::new(0),
            consistency_failures: AtomicU64::new(0),
            requests_total: AtomicU64::new(0),
        }
    }

    pub fn record_tick(&self) {
        self.ticks_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_dropped_notifications(&self, count: u64) {
        self.dropped_notifications.store(count, Ordering::Relaxed);
    }

    pub fn set_store_errors(&self, count: u64) {
        self.store_errors.store(count, Ordering::Relaxed);
    }

    pub fn set_consistency_failures(&self, count: u64) {
        self.consistency_failures.store(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks_processed: self.ticks_processed.load(Ordering::Relaxed),
            dropped_notifications: self.dropped_notifications.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            consistency_failures: self.consistency_failures.load(Ordering::Relaxed),
            requests_total: self.requests_total.load(Ordering::Relaxed),
            uptime_seconds: self.started_at.elapsed().as_secs(),
        }
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
