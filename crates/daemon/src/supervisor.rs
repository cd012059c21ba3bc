// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process lifecycle: start components in dependency order, run the monitors and the
//! HTTP listener, stop in reverse order on shutdown.
//!
//! Grounded in the PID-lock / version-file / bind-listener-last mechanics of a
//! Unix-socket daemon's lifecycle module, adapted to this daemon's HTTP listener.

use crate::config::Config;
use crate::http::router;
use crate::metrics::MetricsRegistry;
use crate::rate_limiter::RateLimiter;
use crate::state::AppState;
use cctrack_adapters::{ConnScanner, HttpClassifier, NoopWireEventSource, ProcConnScanner};
use cctrack_core::{Clock, SystemClock, Thresholds, ThresholdsHandle, UuidIdGen};
use cctrack_engine::{Coordinator, SessionFSM};
use cctrack_signal::SignalFuser;
use cctrack_storage::Store;
use fs2::FileExt;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{error, info, warn};

const SHUTDOWN_BUDGET: Duration = Duration::from_secs(10);
const HEALTH_MONITOR_INTERVAL: Duration = Duration::from_secs(30);
const WORK_BLOCK_TIMEOUT_INTERVAL: Duration = Duration::from_secs(60);
const SESSION_EXPIRY_INTERVAL: Duration = Duration::from_secs(5 * 60);
const CONN_TABLE_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("another daemon instance is already running (failed to acquire {0:?})")]
    LockHeld(PathBuf),
    #[error("failed to bind listener on {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),
    #[error("storage error: {0}")]
    Store(#[from] cctrack_storage::StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Panic/restart counters for the four background monitors.
#[derive(Debug, Default)]
pub struct MonitorHealth {
    pub health_restarts: AtomicU64,
    pub work_block_restarts: AtomicU64,
    pub session_expiry_restarts: AtomicU64,
    pub conn_cleanup_restarts: AtomicU64,
}

pub struct Supervisor {
    config: Config,
    lock_file: File,
    state: Arc<AppState>,
    fsm: Arc<SessionFSM<UuidIdGen>>,
    fuser: Arc<SignalFuser>,
    conn_scanner: Arc<ProcConnScanner>,
    clock: Arc<dyn Clock>,
    tracked_pattern: cctrack_adapters::TrackedProcessPattern,
    tick_secs: u64,
    monitor_health: Arc<MonitorHealth>,
    shutdown: Arc<Notify>,
}

impl Supervisor {
    /// Start every component in dependency order. The HTTP listener is bound last,
    /// after every other component has started successfully.
    pub async fn start(config: Config) -> Result<(Self, tokio::net::TcpListener), SupervisorError> {
        std::fs::create_dir_all(&config.state_dir)?;
        std::fs::create_dir_all(&config.log_dir)?;

        let lock_file = acquire_lock(&config.lock_path)?;
        std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

        let store = Arc::new(Store::open(&config.db_path)?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let tracked_pattern = cctrack_adapters::TrackedProcessPattern::new(&config.tracked_process_pattern)
            .unwrap_or_default();
        let conn_scanner = Arc::new(ProcConnScanner::new(
            PathBuf::from("/proc"),
            HashSet::from([80, 443]),
            Arc::clone(&clock),
        ));
        let classifier = Arc::new(HttpClassifier::new());
        tokio::spawn(Arc::clone(&classifier).run(Arc::new(NoopWireEventSource)));

        let thresholds = ThresholdsHandle::new(Thresholds::default());
        let tick_secs = thresholds.get().tick_secs;
        let fuser = Arc::new(SignalFuser::new(
            Arc::clone(&conn_scanner) as Arc<dyn ConnScanner>,
            classifier,
            thresholds,
            Arc::clone(&clock),
        ));

        let (state_tx, state_rx) = tokio::sync::mpsc::channel(100);
        let fsm = Arc::new(SessionFSM::new(UuidIdGen, Arc::clone(&clock), Arc::clone(&store), state_tx));
        let coordinator = Arc::new(Coordinator::new(Arc::clone(&fsm), Arc::clone(&store), Arc::clone(&clock)));
        tokio::spawn(Arc::clone(&coordinator).run(state_rx));

        let metrics = Arc::new(MetricsRegistry::new());
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit_per_sec));
        let state = Arc::new(AppState::new(
            Arc::clone(&fsm),
            coordinator,
            Arc::clone(&store),
            metrics,
            Arc::clone(&clock),
            rate_limiter,
        ));

        let listener = tokio::net::TcpListener::bind(config.listen_addr)
            .await
            .map_err(|e| SupervisorError::BindFailed(config.listen_addr, e))?;

        state.mark_ready();
        info!(addr = %config.listen_addr, "daemon ready");

        Ok((
            Self {
                config,
                lock_file,
                state,
                fsm,
                fuser,
                conn_scanner,
                clock,
                tracked_pattern,
                tick_secs,
                monitor_health: Arc::new(MonitorHealth::default()),
                shutdown: Arc::new(Notify::new()),
            },
            listener,
        ))
    }

    pub fn app_state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the tick loop, all four monitors, and the HTTP listener until a shutdown
    /// signal arrives. Each monitor is panic-isolated: a panicked task is restarted.
    pub async fn run(&self, listener: tokio::net::TcpListener) {
        let tick_task = self.spawn_tick_loop();
        let health_task = self.spawn_monitor(
            "health",
            HEALTH_MONITOR_INTERVAL,
            Arc::clone(&self.monitor_health),
            |health| &health.health_restarts,
            {
                let state = Arc::clone(&self.state);
                move || {
                    let state = Arc::clone(&state);
                    async move {
                        if let Err(error) = state.fsm.consistent_snapshot() {
                            warn!(%error, "health monitor: fsm inconsistent");
                        }
                        state.metrics.set_store_errors(state.fsm.metrics.store_errors.load(Ordering::Relaxed));
                        state.metrics.set_dropped_notifications(
                            state.fsm.metrics.dropped_notifications.load(Ordering::Relaxed),
                        );
                        state.metrics.set_consistency_failures(
                            state.coordinator.metrics.consistency_failures.load(Ordering::Relaxed),
                        );
                    }
                }
            },
        );
        let work_block_task = self.spawn_monitor(
            "work-block-timeout",
            WORK_BLOCK_TIMEOUT_INTERVAL,
            Arc::clone(&self.monitor_health),
            |health| &health.work_block_restarts,
            {
                let fsm = Arc::clone(&self.fsm);
                let clock = Arc::clone(&self.state.clock);
                move || {
                    let fsm = Arc::clone(&fsm);
                    let clock = Arc::clone(&clock);
                    async move { fsm.tick(clock.now()) }
                }
            },
        );
        let session_expiry_task = self.spawn_monitor(
            "session-expiry",
            SESSION_EXPIRY_INTERVAL,
            Arc::clone(&self.monitor_health),
            |health| &health.session_expiry_restarts,
            {
                let fsm = Arc::clone(&self.fsm);
                let clock = Arc::clone(&self.state.clock);
                move || {
                    let fsm = Arc::clone(&fsm);
                    let clock = Arc::clone(&clock);
                    async move { fsm.tick(clock.now()) }
                }
            },
        );
        let conn_cleanup_task = self.spawn_monitor(
            "conn-table-cleanup",
            CONN_TABLE_CLEANUP_INTERVAL,
            Arc::clone(&self.monitor_health),
            |health| &health.conn_cleanup_restarts,
            {
                let conn_scanner = Arc::clone(&self.conn_scanner);
                let clock = Arc::clone(&self.clock);
                move || {
                    let conn_scanner = Arc::clone(&conn_scanner);
                    let clock = Arc::clone(&clock);
                    async move { conn_scanner.evict_stale(clock.now()) }
                }
            },
        );

        let shutdown = Arc::clone(&self.shutdown);
        let router = router(self.app_state());
        let make_service = router.into_make_service_with_connect_info::<std::net::SocketAddr>();
        let serve_result = axum::serve(listener, make_service)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.notified() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            })
            .await;
        if let Err(error) = serve_result {
            error!(%error, "http listener exited with an error");
        }

        tick_task.abort();
        health_task.abort();
        work_block_task.abort();
        session_expiry_task.abort();
        conn_cleanup_task.abort();
    }

    pub fn request_shutdown(&self) {
        self.shutdown.notify_waiters();
    }

    /// Graceful shutdown with a fixed budget: flush what we can, then force-finalize
    /// the FSM in-memory and remove the lock/version files last.
    pub async fn shutdown(&self) {
        self.state.mark_not_ready();
        let finalize = async { self.fsm.finalize_all() };
        if tokio::time::timeout(SHUTDOWN_BUDGET, async { finalize.await }).await.is_err() {
            warn!("shutdown budget exceeded, finalizing fsm in-memory without further persistence");
            self.fsm.finalize_all();
        }
        let _ = std::fs::remove_file(&self.config.version_path);
        let _ = std::fs::remove_file(&self.config.lock_path);
        let _ = FileExt::unlock(&self.lock_file);
        info!("daemon shutdown complete");
    }

    fn spawn_tick_loop(&self) -> tokio::task::JoinHandle<()> {
        let fuser = Arc::clone(&self.fuser);
        let fsm = Arc::clone(&self.fsm);
        let pattern = self.tracked_pattern.clone();
        let metrics = Arc::clone(&self.state.metrics);
        let clock = Arc::clone(&self.state.clock);
        let period = Duration::from_secs(self.tick_secs.max(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let pids = cctrack_adapters::scan_tracked_pids(std::path::Path::new("/proc"), &pattern);
                fsm.note_tracked_population(pids.len());
                match fuser.tick(&pids).await {
                    Ok(indicator) => {
                        fsm.observe(clock.now(), indicator.is_real_activity);
                        metrics.record_tick();
                    }
                    Err(error) => {
                        warn!(%error, "signal tick failed");
                    }
                }
            }
        })
    }

    fn spawn_monitor<F, Fut>(
        &self,
        name: &'static str,
        interval: Duration,
        health: Arc<MonitorHealth>,
        counter: fn(&MonitorHealth) -> &AtomicU64,
        mut task: F,
    ) -> tokio::task::JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let fut = task();
                if tokio::spawn(fut).await.is_err() {
                    counter(&health).fetch_add(1, Ordering::Relaxed);
                    error!(monitor = name, "monitor task panicked, continuing on next tick");
                }
            }
        })
    }
}

fn acquire_lock(lock_path: &std::path::Path) -> Result<File, SupervisorError> {
    let mut file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(lock_path)?;
    file.try_lock_exclusive().map_err(|_| SupervisorError::LockHeld(lock_path.to_path_buf()))?;
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
