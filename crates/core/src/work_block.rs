// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WorkBlock entity: a maximal span of continuous activity inside a session.

use crate::session::SessionId;
use serde::{Deserialize, Serialize};

/// Idle gap (seconds) after which a work block is finalized.
pub const IDLE_TIMEOUT_SECS: i64 = 5 * 60;

crate::define_id! {
    /// Unique identifier for a work block.
    pub struct WorkBlockId;
}

/// A maximal interval of continuous activity inside a session.
///
/// Broken whenever no real activity is observed for [`IDLE_TIMEOUT_SECS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkBlock {
    pub id: WorkBlockId,
    pub session_id: SessionId,
    pub start_time: i64,
    pub last_activity: i64,
    pub end_time: Option<i64>,
    pub is_active: bool,
}

impl WorkBlock {
    pub fn start(id: WorkBlockId, session_id: SessionId, ts: i64) -> Self {
        Self {
            id,
            session_id,
            start_time: ts,
            last_activity: ts,
            end_time: None,
            is_active: true,
        }
    }

    /// Advance `last_activity` to `ts`, clamped so it never precedes `start_time`.
    pub fn touch(&mut self, ts: i64) {
        self.last_activity = ts.max(self.start_time);
    }

    /// Finalize the block, fixing `end_time` to its current `last_activity`.
    pub fn finalize(&mut self) {
        self.end_time = Some(self.last_activity);
        self.is_active = false;
    }

    /// Duration of the block so far (or final, once finalized). Always >= 0.
    pub fn duration_secs(&self) -> i64 {
        (self.last_activity - self.start_time).max(0)
    }
}

#[cfg(test)]
#[path = "work_block_tests.rs"]
mod tests;
