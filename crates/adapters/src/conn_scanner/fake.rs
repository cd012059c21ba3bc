// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake `ConnScanner` for testing `SignalFuser` without a real `/proc`.

use super::{ConnScanner, ConnScannerError, ConnSnapshot};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Hands out pre-scripted snapshots in order, repeating the last one once exhausted.
pub struct FakeConnScanner {
    queued: Mutex<VecDeque<ConnSnapshot>>,
    last: Mutex<ConnSnapshot>,
}

impl FakeConnScanner {
    pub fn new() -> Self {
        Self { queued: Mutex::new(VecDeque::new()), last: Mutex::new(ConnSnapshot::default()) }
    }

    pub fn push(&self, snapshot: ConnSnapshot) {
        self.queued.lock().push_back(snapshot);
    }
}

impl Default for FakeConnScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnScanner for FakeConnScanner {
    async fn snapshot(&self, _tracked_pids: &[u32]) -> Result<ConnSnapshot, ConnScannerError> {
        let next = self.queued.lock().pop_front();
        let snapshot = next.unwrap_or_else(|| self.last.lock().clone());
        *self.last.lock() = snapshot.clone();
        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
