// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cctrack-hook`: invoked by the shell hook on every assistant lifecycle event.
//!
//! Talks to the daemon over HTTP and never blocks the calling shell for long —
//! a daemon that is slow or down degrades to a warning, not a stuck prompt.

use cctrack_cli::client::{ActivityRequest, ClientError, DaemonClient, SessionContextDto, SessionEndRequest, SessionStartRequest};
use clap::{Parser, ValueEnum};
use std::time::Duration;

const DEFAULT_DAEMON_URL: &str = "http://127.0.0.1:47620";
const DEFAULT_RETRY: u32 = 3;
const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "snake_case")]
enum HookType {
    Start,
    PreAction,
    End,
    PostAction,
    Activity,
}

#[derive(Parser, Debug)]
#[command(name = "cctrack-hook", about = "Report an assistant lifecycle event to the tracking daemon")]
struct Args {
    #[arg(long, env = "CLAUDE_DAEMON_URL", default_value = DEFAULT_DAEMON_URL)]
    daemon_url: String,

    #[arg(long, value_enum)]
    r#type: HookType,

    #[arg(long)]
    duration: Option<f64>,

    #[arg(long)]
    tokens: Option<u64>,

    #[arg(long)]
    success: Option<bool>,

    #[arg(long)]
    error: Option<String>,

    #[arg(long)]
    command: Option<String>,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    #[arg(long, default_value_t = DEFAULT_RETRY)]
    retry: u32,

    #[arg(long)]
    skip_on_failure: bool,

    #[arg(long, env = "CLAUDE_HOOK_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let client = DaemonClient::with_timeout(args.daemon_url.clone(), Duration::from_secs(args.timeout));
    let context = session_context();

    let outcome = match args.r#type {
        HookType::Start => {
            let request = SessionStartRequest { context, command: args.command.clone() };
            send_with_retry(args.retry, args.debug, || client.session_start(&request)).await.map(|_| ())
        }
        HookType::End => {
            let request = SessionEndRequest {
                context,
                processing_duration_seconds: args.duration,
                token_count: args.tokens,
                success: args.success,
                error_message: args.error.clone(),
            };
            send_with_retry(args.retry, args.debug, || client.session_end(&request)).await.map(|_| ())
        }
        HookType::PreAction | HookType::PostAction | HookType::Activity => {
            let request = ActivityRequest { context };
            send_with_retry(args.retry, args.debug, || client.activity(&request)).await.map(|_| ())
        }
    };

    match outcome {
        Ok(()) => std::process::exit(0),
        Err(error) => {
            if args.skip_on_failure {
                eprintln!("warning: cctrack-hook failed, continuing anyway: {error}");
                std::process::exit(0);
            }
            eprintln!("error: cctrack-hook failed: {error}");
            std::process::exit(1);
        }
    }
}

/// Retry only `transient_io` failures, at most `retry` times, with linear 1s×n backoff.
async fn send_with_retry<T, F, Fut>(retry: u32, debug: bool, mut call: F) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_transient() && attempt < retry => {
                attempt += 1;
                if debug {
                    eprintln!("debug: attempt {attempt} failed ({error}), retrying");
                }
                tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
            }
            Err(error) => return Err(error),
        }
    }
}

fn session_context() -> SessionContextDto {
    let working_dir = std::env::current_dir().unwrap_or_default();
    let project_path = std::env::var("CLAUDE_PROJECT_DIR").map(std::path::PathBuf::from).unwrap_or_else(|_| working_dir.clone());
    let user_id = std::env::var("USER").or_else(|_| std::env::var("LOGNAME")).unwrap_or_else(|_| "unknown".to_string());
    let shell_pid = std::os::unix::process::parent_id();
    let terminal_pid =
        std::env::var("CLAUDE_TERMINAL_PID").ok().and_then(|v| v.parse().ok()).unwrap_or(shell_pid);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    SessionContextDto {
        terminal_pid,
        shell_pid,
        working_dir: working_dir.display().to_string(),
        project_path: project_path.display().to_string(),
        user_id,
        timestamp,
    }
}
