// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::session::{Session, SessionId};
use crate::work_block::{WorkBlock, WorkBlockId};

/// Build a session starting at `start`, still active.
pub fn session_at(id: &str, start: i64) -> Session {
    Session::start(SessionId::new(id), start)
}

/// Build a finalized session covering `[start, start + 5h)`.
pub fn finished_session(id: &str, start: i64) -> Session {
    let mut s = Session::start(SessionId::new(id), start);
    s.finalize();
    s
}

/// Build an active work block starting at `start`.
pub fn block_at(id: &str, session_id: &str, start: i64) -> WorkBlock {
    WorkBlock::start(WorkBlockId::new(id), SessionId::new(session_id), start)
}

/// Build a finalized work block `[start, end]`.
pub fn finished_block(id: &str, session_id: &str, start: i64, end: i64) -> WorkBlock {
    let mut b = WorkBlock::start(WorkBlockId::new(id), SessionId::new(session_id), start);
    b.touch(end);
    b.finalize();
    b
}
