// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator: consumes `StateChange` events off the FSM, fans them out to
//! subscribers, and keeps the `work_days` rollup current.

use crate::session_fsm::SessionFSM;
use async_trait::async_trait;
use cctrack_core::{Clock, IdGen, StateChange};
use cctrack_storage::Store;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const SUBSCRIBER_TIMEOUT: Duration = Duration::from_secs(5);
const CONSISTENCY_CHECK_INTERVAL: Duration = Duration::from_secs(120);

#[async_trait]
pub trait StateChangeSubscriber: Send + Sync + 'static {
    async fn on_state_change(&self, change: StateChange);
}

#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
    pub subscriber_panics: AtomicU64,
    pub subscriber_timeouts: AtomicU64,
    pub consistency_failures: AtomicU64,
}

pub struct Coordinator<G: IdGen + 'static> {
    fsm: Arc<SessionFSM<G>>,
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    subscribers: RwLock<Vec<(u64, Arc<dyn StateChangeSubscriber>)>>,
    next_id: AtomicU64,
    pub metrics: CoordinatorMetrics,
}

impl<G: IdGen + 'static> Coordinator<G> {
    pub fn new(fsm: Arc<SessionFSM<G>>, store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            fsm,
            store,
            clock,
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            metrics: CoordinatorMetrics::default(),
        }
    }

    pub fn subscribe(&self, subscriber: Arc<dyn StateChangeSubscriber>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers.write().push((id, subscriber));
        id
    }

    /// A no-op if `id` isn't (or is no longer) subscribed.
    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.write().retain(|(existing, _)| *existing != id);
    }

    /// Drains `rx` until the producer drops it, running the periodic
    /// consistency check alongside.
    pub async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<StateChange>) {
        let monitor = Arc::clone(&self);
        let monitor_handle = tokio::spawn(async move { monitor.run_consistency_monitor().await });

        while let Some(change) = rx.recv().await {
            self.update_rollup(&change);
            self.fan_out(change).await;
        }

        monitor_handle.abort();
    }

    fn update_rollup(&self, change: &StateChange) {
        let needs_rollup = matches!(change, StateChange::BlockFinished { .. } | StateChange::SessionExpired { .. });
        if !needs_rollup {
            return;
        }
        if let Err(error) = self.store.rebuild_work_days(self.clock.now()) {
            tracing::error!(%error, "failed to rebuild work_days rollup");
        }
    }

    async fn fan_out(&self, change: StateChange) {
        let subscribers = self.subscribers.read().clone();

        // Spawn every subscriber's notification before awaiting any of them, so they
        // run concurrently and total fan-out latency is bounded by the slowest one.
        let handles: Vec<(u64, tokio::task::JoinHandle<()>)> = subscribers
            .into_iter()
            .map(|(id, subscriber)| {
                let change = change.clone();
                (id, tokio::spawn(async move { subscriber.on_state_change(change).await }))
            })
            .collect();

        for (id, handle) in handles {
            match tokio::time::timeout(SUBSCRIBER_TIMEOUT, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(join_error)) => {
                    self.metrics.subscriber_panics.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(subscriber_id = id, error = %join_error, "subscriber panicked");
                }
                Err(_elapsed) => {
                    self.metrics.subscriber_timeouts.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(subscriber_id = id, "subscriber notification timed out");
                }
            }
        }
    }

    async fn run_consistency_monitor(self: Arc<Self>) {
        let mut interval = tokio::time::interval(CONSISTENCY_CHECK_INTERVAL);
        interval.tick().await; // first tick fires immediately; skip it
        loop {
            interval.tick().await;
            if let Err(error) = self.fsm.consistent_snapshot() {
                self.metrics.consistency_failures.fetch_add(1, Ordering::Relaxed);
                tracing::error!(%error, "state consistency check failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
