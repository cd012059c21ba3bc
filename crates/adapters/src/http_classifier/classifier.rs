// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Counts HTTP methods observed on the wire, one tick's worth at a time.

use super::{WireEvent, WireEventSource};
use cctrack_core::HttpMethod;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct Counters {
    method_counts: HashMap<HttpMethod, u32>,
    user_interactions: u32,
    background_ops: u32,
    any_http_seen: bool,
}

/// A snapshot of one tick's accumulated HTTP activity.
#[derive(Debug, Clone, Default)]
pub struct ClassifierSnapshot {
    pub method_counts: HashMap<HttpMethod, u32>,
    pub user_interactions: u32,
    pub background_ops: u32,
    pub any_http_seen: bool,
}

/// Accumulates wire events between ticks; `snapshot_and_reset` hands off and clears.
pub struct HttpClassifier {
    counters: Mutex<Counters>,
}

impl HttpClassifier {
    pub fn new() -> Self {
        Self { counters: Mutex::new(Counters::default()) }
    }

    /// Record one observed event. Method alone is authoritative; byte size is never
    /// consulted once a method has been seen.
    pub fn record(&self, event: &WireEvent) {
        let mut counters = self.counters.lock();
        counters.any_http_seen = true;
        *counters.method_counts.entry(event.method).or_insert(0) += 1;
        if event.method.is_user_interaction() {
            counters.user_interactions += 1;
        } else {
            counters.background_ops += 1;
        }
    }

    /// Drain `source` until it closes, recording every event as it arrives.
    pub async fn run(self: Arc<Self>, source: Arc<dyn WireEventSource>) {
        while let Some(event) = source.recv().await {
            self.record(&event);
        }
    }

    pub fn snapshot_and_reset(&self) -> ClassifierSnapshot {
        let mut counters = self.counters.lock();
        let taken = std::mem::take(&mut *counters);
        ClassifierSnapshot {
            method_counts: taken.method_counts,
            user_interactions: taken.user_interactions,
            background_ops: taken.background_ops,
            any_http_seen: taken.any_http_seen,
        }
    }
}

impl Default for HttpClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
