// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake `WireEventSource` for driving `HttpClassifier`/`SignalFuser` tests deterministically.

use super::{WireEvent, WireEventSource};
use async_trait::async_trait;
use tokio::sync::mpsc;

pub struct FakeWireEventSource {
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<WireEvent>>,
    tx: parking_lot::Mutex<Option<mpsc::UnboundedSender<WireEvent>>>,
}

impl FakeWireEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { rx: tokio::sync::Mutex::new(rx), tx: parking_lot::Mutex::new(Some(tx)) }
    }

    pub fn push(&self, event: WireEvent) {
        if let Some(tx) = self.tx.lock().as_ref() {
            let _ = tx.send(event);
        }
    }

    /// Close the sender half, so a task draining `recv()` observes end-of-stream.
    pub fn close(&self) {
        *self.tx.lock() = None;
    }
}

impl Default for FakeWireEventSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WireEventSource for FakeWireEventSource {
    async fn recv(&self) -> Option<WireEvent> {
        self.rx.lock().await.recv().await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
