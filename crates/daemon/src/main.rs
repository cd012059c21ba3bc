// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cctrackd`: the work-time telemetry daemon.
//!
//! Typically started once per user and left running; the hook CLI and the report CLI
//! both talk to it over HTTP.

use cctrack_daemon::{Config, Supervisor};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let _log_guard = setup_logging(&config)?;

    info!(state_dir = %config.state_dir.display(), "starting cctrackd");

    let (supervisor, listener) = match Supervisor::start(config).await {
        Ok(started) => started,
        Err(error) => {
            error!(%error, "failed to start daemon");
            return Err(error.into());
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let run = supervisor.run(listener);
    tokio::pin!(run);

    tokio::select! {
        _ = &mut run => {}
        _ = sigterm.recv() => {
            info!("received SIGTERM, shutting down");
            supervisor.request_shutdown();
            run.await;
        }
        _ = sigint.recv() => {
            info!("received SIGINT, shutting down");
            supervisor.request_shutdown();
            run.await;
        }
    }

    supervisor.shutdown().await;
    Ok(())
}

fn setup_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    std::fs::create_dir_all(&config.log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "cctrackd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}
