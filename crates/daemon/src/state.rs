// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state handed to every HTTP handler.

use crate::metrics::MetricsRegistry;
use crate::rate_limiter::RateLimiter;
use cctrack_core::{Clock, UuidIdGen};
use cctrack_engine::{Coordinator, SessionFSM};
use cctrack_storage::Store;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct AppState {
    pub fsm: Arc<SessionFSM<UuidIdGen>>,
    pub coordinator: Arc<Coordinator<UuidIdGen>>,
    pub store: Arc<Store>,
    pub metrics: Arc<MetricsRegistry>,
    pub clock: Arc<dyn Clock>,
    pub rate_limiter: Arc<RateLimiter>,
    ready: AtomicBool,
}

impl AppState {
    pub fn new(
        fsm: Arc<SessionFSM<UuidIdGen>>,
        coordinator: Arc<Coordinator<UuidIdGen>>,
        store: Arc<Store>,
        metrics: Arc<MetricsRegistry>,
        clock: Arc<dyn Clock>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self { fsm, coordinator, store, metrics, clock, rate_limiter, ready: AtomicBool::new(false) }
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn mark_not_ready(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}
