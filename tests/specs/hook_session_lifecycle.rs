//! Shell hook → daemon → report round trip.

use crate::prelude::*;

#[test]
fn a_session_start_hook_opens_a_session_visible_in_status() {
    let daemon = Daemon::start();

    daemon.hook().args(["--type", "start", "--command", "echo hi"]).output().expect("run").ok();

    let status = daemon.report().args(["status", "-o", "json"]).output().expect("run");
    status.ok();
    let body: serde_json::Value = serde_json::from_slice(&status.stdout).expect("json");
    assert!(body["session"].is_object(), "expected an open session, got {body}");
    assert_eq!(body["session"]["is_active"], serde_json::json!(true));
}

#[test]
fn activity_keepalives_do_not_fail_even_without_a_prior_start() {
    let daemon = Daemon::start();

    daemon.hook().args(["--type", "activity"]).output().expect("run").ok();

    let status = daemon.report().args(["status", "-o", "json"]).output().expect("run");
    status.ok();
}

#[test]
fn session_end_is_accepted_and_the_listing_reflects_it() {
    let daemon = Daemon::start();

    daemon.hook().args(["--type", "start"]).output().expect("run").ok();
    daemon
        .hook()
        .args(["--type", "end", "--duration", "1.5", "--tokens", "42", "--success", "true"])
        .output()
        .expect("run")
        .ok();

    let sessions = daemon.report().args(["sessions", "-o", "json"]).output().expect("run");
    sessions.ok();
    let body: serde_json::Value = serde_json::from_slice(&sessions.stdout).expect("json");
    assert!(body.as_array().map(|a| !a.is_empty()).unwrap_or(false), "expected at least one session: {body}");
}

#[test]
fn an_unreachable_daemon_causes_the_hook_to_exit_nonzero_without_skip_on_failure() {
    let hook = std::process::Command::new(hook_binary())
        .env("CLAUDE_DAEMON_URL", "http://127.0.0.1:1")
        .args(["--type", "activity", "--retry", "0", "--timeout", "1"])
        .output()
        .expect("run");
    assert!(!hook.status.success());
}

#[test]
fn skip_on_failure_always_exits_zero_even_when_the_daemon_is_unreachable() {
    let hook = std::process::Command::new(hook_binary())
        .env("CLAUDE_DAEMON_URL", "http://127.0.0.1:1")
        .args(["--type", "activity", "--retry", "0", "--timeout", "1", "--skip-on-failure"])
        .output()
        .expect("run");
    assert!(hook.status.success());
}
