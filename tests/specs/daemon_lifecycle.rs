//! Daemon process lifecycle: PID lock, version file, health/ready surfacing.

use crate::prelude::*;

#[test]
fn a_fresh_daemon_reports_healthy_and_ready() {
    let daemon = Daemon::start();

    let health = daemon.report().args(["status", "-o", "json"]).output().expect("run");
    health.ok();

    assert!(daemon.state_path().join("daemon.pid").exists());
    assert!(daemon.state_path().join("daemon.version").exists());
}

#[test]
fn a_second_daemon_refuses_to_start_against_the_same_state_dir() {
    let daemon = Daemon::start();

    // A second instance pointed at the same state dir must lose the PID lock race.
    let mut second = std::process::Command::new(daemon_binary());
    second.env("CLAUDE_STATE_DIR", daemon.state_path());
    second.env("CLAUDE_LISTEN_ADDR", "127.0.0.1:0");
    second.stdout(std::process::Stdio::null()).stderr(std::process::Stdio::null());
    let mut child = second.spawn().expect("spawn second daemon");

    let exited = wait_for(2_000, || matches!(child.try_wait(), Ok(Some(_))));
    assert!(exited, "second daemon instance should exit promptly when the lock is held");
    let status = child.wait().expect("wait");
    assert!(!status.success());
}
