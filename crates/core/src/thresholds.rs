// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime-tunable thresholds for the signal layer and state machine.
//!
//! A `parking_lot::RwLock` guards a plain struct, read on every tick and
//! swapped wholesale by `set_thresholds`.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Tick cadence, in seconds.
    pub tick_secs: u64,
    /// Number of past indicators kept for trend checks (one minute at the default tick).
    pub history_size: usize,
    /// Below this byte delta with stable connection count, traffic is keepalive.
    pub keepalive_bytes: u64,
    /// Above this byte delta jump since the previous tick, traffic is a burst.
    pub burst_bytes: u64,
    /// Above this byte delta, traffic alone is enough to call it interactive.
    pub min_active_bytes: u64,
    /// Idle gap after which an active work block is finalized.
    pub idle_timeout_secs: i64,
    /// Width of a session's fixed accounting window.
    pub session_window_secs: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            tick_secs: 5,
            history_size: 12,
            keepalive_bytes: 100,
            burst_bytes: 2048,
            min_active_bytes: 200,
            idle_timeout_secs: crate::work_block::IDLE_TIMEOUT_SECS,
            session_window_secs: crate::session::SESSION_WINDOW_SECS,
        }
    }
}

/// Shared, swappable thresholds handle. Cheap to clone; all clones see updates.
#[derive(Clone)]
pub struct ThresholdsHandle(Arc<RwLock<Thresholds>>);

impl ThresholdsHandle {
    pub fn new(initial: Thresholds) -> Self {
        Self(Arc::new(RwLock::new(initial)))
    }

    pub fn get(&self) -> Thresholds {
        *self.0.read()
    }

    pub fn set(&self, thresholds: Thresholds) {
        *self.0.write() = thresholds;
    }
}

impl Default for ThresholdsHandle {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

#[cfg(test)]
#[path = "thresholds_tests.rs"]
mod tests;
