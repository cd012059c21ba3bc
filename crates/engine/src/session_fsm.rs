// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SessionFSM: the time-accounting state machine.
//!
//! `current_session` and `current_block` live behind ordered read-write locks
//! (session before block, always). `session_end_time` and `last_real_activity` are also
//! kept as plain atomics so the common "just touch the active block" path never takes a
//! write lock: it reads both atomics, decides no structural change is needed, and updates
//! the block's own atomic `last_activity` under only a read lock on the block slot.

use cctrack_core::{Clock, IdGen, Session, SessionId, StateChange, WorkBlock, WorkBlockId, IDLE_TIMEOUT_SECS};
use cctrack_storage::Store;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

const NO_SESSION: i64 = i64::MIN;
const NEVER: i64 = i64::MIN;

/// The currently-open work block, kept mutable-without-locking via its own atomic.
struct ActiveBlock {
    id: WorkBlockId,
    session_id: SessionId,
    start_time: i64,
    last_activity: AtomicI64,
}

impl ActiveBlock {
    fn snapshot_as_work_block(&self, is_active: bool, end_time: Option<i64>) -> WorkBlock {
        WorkBlock {
            id: self.id.clone(),
            session_id: self.session_id.clone(),
            start_time: self.start_time,
            last_activity: self.last_activity.load(Ordering::SeqCst),
            end_time,
            is_active,
        }
    }
}

/// What an `observe`/`tick` call settled on, handed back to HTTP handlers.
#[derive(Debug, Clone)]
pub struct ObserveOutcome {
    pub session_id: Option<SessionId>,
    pub session_start_time: Option<i64>,
    pub session_end_time: Option<i64>,
    pub block_id: Option<WorkBlockId>,
}

#[derive(Debug, Default)]
pub struct FsmMetrics {
    pub store_errors: std::sync::atomic::AtomicU64,
    pub dropped_notifications: std::sync::atomic::AtomicU64,
}

pub struct SessionFSM<G: IdGen + 'static> {
    id_gen: G,
    clock: Arc<dyn Clock>,
    store: Arc<Store>,
    state_tx: mpsc::Sender<StateChange>,

    session: RwLock<Option<Session>>,
    block: RwLock<Option<Arc<ActiveBlock>>>,
    session_end_time: AtomicI64,
    last_real_activity: AtomicI64,
    pub metrics: FsmMetrics,
}

impl<G: IdGen + 'static> SessionFSM<G> {
    pub fn new(id_gen: G, clock: Arc<dyn Clock>, store: Arc<Store>, state_tx: mpsc::Sender<StateChange>) -> Self {
        Self {
            id_gen,
            clock,
            store,
            state_tx,
            session: RwLock::new(None),
            block: RwLock::new(None),
            session_end_time: AtomicI64::new(NO_SESSION),
            last_real_activity: AtomicI64::new(NEVER),
            metrics: FsmMetrics::default(),
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    pub fn current_block(&self) -> Option<WorkBlock> {
        self.block.read().as_ref().map(|b| b.snapshot_as_work_block(true, None))
    }

    /// `(session, block)`, erroring if a block is attached to a session it doesn't belong to.
    pub fn consistent_snapshot(&self) -> Result<(Option<Session>, Option<WorkBlock>), ConsistencyError> {
        let session = self.session.read().clone();
        let block = self.block.read().as_ref().map(|b| b.snapshot_as_work_block(true, None));
        if let (Some(s), Some(b)) = (&session, &block) {
            if b.session_id != s.id {
                return Err(ConsistencyError::SessionBlockMismatch);
            }
        }
        Ok((session, block))
    }

    pub fn last_real_activity(&self) -> Option<i64> {
        match self.last_real_activity.load(Ordering::SeqCst) {
            NEVER => None,
            ts => Some(ts),
        }
    }

    /// Single entry point from `SignalFuser` and `HookEndpoint`.
    pub fn observe(&self, ts: i64, is_real: bool) -> ObserveOutcome {
        if !is_real {
            return self.current_ids();
        }

        let last_activity = self.last_real_activity.load(Ordering::SeqCst);
        if last_activity != NEVER && ts < last_activity {
            tracing::debug!(ts, last_activity, "dropping out-of-order observation");
            self.tick(self.clock.now());
            return self.current_ids();
        }

        let session_end = self.session_end_time.load(Ordering::SeqCst);
        if session_end == NO_SESSION || ts > session_end {
            return self.start_new_session(ts);
        }

        let existing_block = self.block.read().clone();
        match existing_block {
            None => self.start_new_block(ts),
            Some(active) => {
                if last_activity != NEVER && ts - last_activity > IDLE_TIMEOUT_SECS {
                    self.rotate_block(ts, &active)
                } else {
                    let clamped = ts.max(active.start_time);
                    active.last_activity.store(clamped, Ordering::SeqCst);
                    self.last_real_activity.store(ts, Ordering::SeqCst);
                    ObserveOutcome {
                        session_id: Some(active.session_id.clone()),
                        session_start_time: None,
                        session_end_time: Some(session_end),
                        block_id: Some(active.id.clone()),
                    }
                }
            }
        }
    }

    /// Timeout checks, run at least once per tick even with no new activity.
    pub fn tick(&self, now: i64) {
        let last_activity = self.last_real_activity.load(Ordering::SeqCst);
        if last_activity != NEVER && now - last_activity > IDLE_TIMEOUT_SECS {
            self.finalize_block_if_active(last_activity);
        }

        let session_end = self.session_end_time.load(Ordering::SeqCst);
        if session_end != NO_SESSION && now > session_end {
            self.finalize_current_session();
        }
    }

    /// The session also ends early once the tracked process population drops to zero,
    /// independent of the 5h window. Called by the connection-scan tick with the pid
    /// count observed that tick.
    pub fn note_tracked_population(&self, tracked_pid_count: usize) {
        if tracked_pid_count == 0 && self.session.read().is_some() {
            self.finalize_current_session();
        }
    }

    /// Idempotent shutdown: finalize the block, then the session.
    pub fn finalize_all(&self) {
        let last_activity = self.last_real_activity.load(Ordering::SeqCst);
        self.finalize_block_if_active(last_activity);
        self.finalize_current_session();
        self.publish(StateChange::Shutdown { ts: self.clock.now() });
    }

    fn current_ids(&self) -> ObserveOutcome {
        let session = self.session.read().clone();
        let block = self.block.read().clone();
        ObserveOutcome {
            session_id: session.as_ref().map(|s| s.id.clone()),
            session_start_time: session.as_ref().map(|s| s.start_time),
            session_end_time: session.as_ref().map(|s| s.end_time),
            block_id: block.as_ref().map(|b| b.id.clone()),
        }
    }

    fn start_new_session(&self, ts: i64) -> ObserveOutcome {
        let mut session_guard = self.session.write();
        // Double-check: another caller may have already rotated the session while we
        // were waiting for the write lock.
        if let Some(existing) = session_guard.as_ref() {
            if ts <= existing.end_time {
                drop(session_guard);
                return self.start_new_block_locked(ts);
            }
        }

        if let Some(mut previous) = session_guard.take() {
            previous.finalize();
            self.persist_session(&previous);
            self.publish(StateChange::SessionExpired { ts, session_id: previous.id.clone() });
        }

        let session = Session::start(SessionId::new(self.id_gen.next()), ts);
        self.session_end_time.store(session.end_time, Ordering::SeqCst);
        self.persist_session(&session);
        self.publish(StateChange::SessionStarted { ts, session_id: session.id.clone() });
        let outcome_session = session.clone();
        *session_guard = Some(session);
        drop(session_guard);

        // Finalize any stray block (shouldn't normally exist) before starting fresh.
        if let Some(stray) = self.block.write().take() {
            let finalized = stray.snapshot_as_work_block(false, Some(stray.last_activity.load(Ordering::SeqCst)));
            self.persist_block(&finalized);
        }

        let block_id = self.create_block(&outcome_session.id, ts);
        self.last_real_activity.store(ts, Ordering::SeqCst);

        ObserveOutcome {
            session_id: Some(outcome_session.id),
            session_start_time: Some(outcome_session.start_time),
            session_end_time: Some(outcome_session.end_time),
            block_id: Some(block_id),
        }
    }

    fn start_new_block(&self, ts: i64) -> ObserveOutcome {
        self.start_new_block_locked(ts)
    }

    fn start_new_block_locked(&self, ts: i64) -> ObserveOutcome {
        let session_id = match self.session.read().as_ref() {
            Some(s) => s.id.clone(),
            None => return self.current_ids(),
        };

        let mut block_guard = self.block.write();
        if let Some(existing) = block_guard.as_ref() {
            // Double-check: a racing caller already created the block.
            self.last_real_activity.store(ts, Ordering::SeqCst);
            return ObserveOutcome {
                session_id: Some(session_id),
                session_start_time: None,
                session_end_time: Some(self.session_end_time.load(Ordering::SeqCst)),
                block_id: Some(existing.id.clone()),
            };
        }
        drop(block_guard);

        let block_id = self.create_block(&session_id, ts);
        self.last_real_activity.store(ts, Ordering::SeqCst);

        ObserveOutcome {
            session_id: Some(session_id),
            session_start_time: None,
            session_end_time: Some(self.session_end_time.load(Ordering::SeqCst)),
            block_id: Some(block_id),
        }
    }

    fn rotate_block(&self, ts: i64, active: &Arc<ActiveBlock>) -> ObserveOutcome {
        let mut block_guard = self.block.write();
        // Double-check: somebody else may have already rotated this block.
        if let Some(current) = block_guard.as_ref() {
            if Arc::ptr_eq(current, active) {
                let last_activity = current.last_activity.load(Ordering::SeqCst);
                let finalized = current.snapshot_as_work_block(false, Some(last_activity));
                self.persist_block(&finalized);
                self.publish(StateChange::BlockFinished { ts, session_id: current.session_id.clone(), block_id: current.id.clone() });
                *block_guard = None;
            }
        }
        drop(block_guard);

        let session_id = active.session_id.clone();
        let block_id = self.create_block(&session_id, ts);
        self.last_real_activity.store(ts, Ordering::SeqCst);

        ObserveOutcome {
            session_id: Some(session_id),
            session_start_time: None,
            session_end_time: Some(self.session_end_time.load(Ordering::SeqCst)),
            block_id: Some(block_id),
        }
    }

    fn create_block(&self, session_id: &SessionId, ts: i64) -> WorkBlockId {
        let session_start = self.session.read().as_ref().map(|s| s.start_time).unwrap_or(ts);
        let start = ts.max(session_start);
        let id = WorkBlockId::new(self.id_gen.next());
        let active = Arc::new(ActiveBlock {
            id: id.clone(),
            session_id: session_id.clone(),
            start_time: start,
            last_activity: AtomicI64::new(start),
        });
        let work_block = active.snapshot_as_work_block(true, None);
        *self.block.write() = Some(active);
        self.persist_block(&work_block);
        self.publish(StateChange::BlockStarted { ts, session_id: session_id.clone(), block_id: id.clone() });
        id
    }

    fn finalize_block_if_active(&self, end_time: i64) {
        let mut block_guard = self.block.write();
        if let Some(active) = block_guard.take() {
            let finalized = active.snapshot_as_work_block(false, Some(end_time));
            self.persist_block(&finalized);
            self.publish(StateChange::BlockFinished {
                ts: end_time,
                session_id: active.session_id.clone(),
                block_id: active.id.clone(),
            });
        }
    }

    fn finalize_current_session(&self) {
        let end_time = self.last_real_activity.load(Ordering::SeqCst);
        self.finalize_block_if_active(if end_time == NEVER { self.clock.now() } else { end_time });

        let mut session_guard = self.session.write();
        if let Some(mut session) = session_guard.take() {
            session.finalize();
            self.session_end_time.store(NO_SESSION, Ordering::SeqCst);
            let ts = session.end_time;
            self.persist_session(&session);
            self.publish(StateChange::SessionExpired { ts, session_id: session.id.clone() });
        }
    }

    fn persist_session(&self, session: &Session) {
        if let Err(error) = self.store.upsert_session(session, self.clock.now()) {
            self.metrics.store_errors.fetch_add(1, Ordering::Relaxed);
            tracing::error!(%error, session_id = %session.id, "failed to persist session");
        }
    }

    fn persist_block(&self, block: &WorkBlock) {
        if let Err(error) = self.store.upsert_work_block(block, self.clock.now()) {
            self.metrics.store_errors.fetch_add(1, Ordering::Relaxed);
            tracing::error!(%error, block_id = %block.id, "failed to persist work block");
        }
    }

    fn publish(&self, change: StateChange) {
        if self.state_tx.try_send(change).is_err() {
            self.metrics.dropped_notifications.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConsistencyError {
    #[error("current block's session_id does not match current session's id")]
    SessionBlockMismatch,
}

#[cfg(test)]
#[path = "session_fsm_tests.rs"]
mod tests;
