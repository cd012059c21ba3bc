// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session entity: a fixed five-hour wall-clock accounting window.

use serde::{Deserialize, Serialize};

/// Seconds in a session window (5h).
pub const SESSION_WINDOW_SECS: i64 = 5 * 60 * 60;

crate::define_id! {
    /// Unique identifier for a session.
    pub struct SessionId;
}

/// A fixed five-hour accounting window covering activity against the assistant.
///
/// `end_time` is always `start_time + SESSION_WINDOW_SECS` and is immutable once
/// the session is created — the window never grows or shrinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub start_time: i64,
    pub end_time: i64,
    pub is_active: bool,
}

impl Session {
    /// Start a new session at `ts`. `end_time` is fixed at creation and never changes.
    pub fn start(id: SessionId, ts: i64) -> Self {
        Self {
            id,
            start_time: ts,
            end_time: ts + SESSION_WINDOW_SECS,
            is_active: true,
        }
    }

    /// Whether `ts` falls within this session's window (`start_time ..= end_time`).
    ///
    /// A timestamp exactly at `end_time` still belongs to this session; the FSM
    /// only opens a new session once `ts > end_time`.
    pub fn covers(&self, ts: i64) -> bool {
        ts >= self.start_time && ts <= self.end_time
    }

    pub fn finalize(&mut self) {
        self.is_active = false;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
