// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State-change notifications emitted by the session state machine.

use crate::session::SessionId;
use crate::work_block::WorkBlockId;
use serde::{Deserialize, Serialize};

/// A state transition emitted by the FSM, fanned out by the coordinator.
///
/// Every variant carries the timestamp the transition was decided at, so
/// subscribers can total-order changes even when delivery is reordered by
/// the notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateChange {
    SessionStarted { ts: i64, session_id: SessionId },
    SessionExpired { ts: i64, session_id: SessionId },
    BlockStarted {
        ts: i64,
        session_id: SessionId,
        block_id: WorkBlockId,
    },
    BlockFinished {
        ts: i64,
        session_id: SessionId,
        block_id: WorkBlockId,
    },
    Shutdown { ts: i64 },
}

impl StateChange {
    pub fn ts(&self) -> i64 {
        match self {
            Self::SessionStarted { ts, .. }
            | Self::SessionExpired { ts, .. }
            | Self::BlockStarted { ts, .. }
            | Self::BlockFinished { ts, .. }
            | Self::Shutdown { ts } => *ts,
        }
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::SessionStarted { session_id, .. }
            | Self::SessionExpired { session_id, .. }
            | Self::BlockStarted { session_id, .. }
            | Self::BlockFinished { session_id, .. } => Some(session_id),
            Self::Shutdown { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "state_change_tests.rs"]
mod tests;
