//! Test helpers for black-box daemon/CLI specifications.
//!
//! Spawns the real `cctrackd` binary against an isolated state directory and an
//! ephemeral loopback port, then drives it with the real `cctrack-hook` and
//! `cctrack-report` binaries over HTTP.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;

pub const SPEC_POLL_INTERVAL_MS: u64 = 20;
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

pub fn daemon_binary() -> PathBuf {
    binary_path("cctrackd")
}

pub fn hook_binary() -> PathBuf {
    binary_path("cctrack-hook")
}

fn report_binary() -> PathBuf {
    binary_path("cctrack-report")
}

/// Binds an ephemeral loopback port and releases it immediately. Good enough for
/// single-threaded test startup; the daemon rebinds it a few milliseconds later.
fn free_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr.to_string()
}

/// Poll a condition until it returns true or the timeout elapses.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll = Duration::from_millis(SPEC_POLL_INTERVAL_MS);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll);
    }
    false
}

/// A running daemon instance bound to its own state dir and port. Killed on drop.
pub struct Daemon {
    child: Child,
    state_dir: tempfile::TempDir,
    pub url: String,
}

impl Daemon {
    pub fn start() -> Self {
        let state_dir = tempfile::tempdir().expect("tempdir");
        let addr = free_addr();
        let child = Command::new(daemon_binary())
            .env("CLAUDE_STATE_DIR", state_dir.path())
            .env("CLAUDE_LISTEN_ADDR", &addr)
            .env("RUST_LOG", "warn")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn cctrackd");

        let daemon = Self { child, state_dir, url: format!("http://{addr}") };
        let became_ready = wait_for(SPEC_WAIT_MAX_MS, || {
            Command::new(report_binary())
                .env("CLAUDE_DAEMON_URL", &daemon.url)
                .args(["status"])
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
        });
        assert!(became_ready, "daemon did not become ready within {SPEC_WAIT_MAX_MS}ms");
        daemon
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    pub fn hook(&self) -> Command {
        let mut cmd = Command::new(hook_binary());
        cmd.env("CLAUDE_DAEMON_URL", &self.url);
        cmd
    }

    pub fn report(&self) -> Command {
        let mut cmd = Command::new(report_binary());
        cmd.env("CLAUDE_DAEMON_URL", &self.url);
        cmd
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A minimal blocking HTTP/1.1 GET, good enough for hitting the admin surface
/// without pulling a blocking HTTP client into the test binary.
pub fn http_get(base_url: &str, path: &str) -> (u16, String) {
    use std::io::{Read, Write};
    use std::net::TcpStream;

    let authority = base_url.trim_start_matches("http://");
    let mut stream = TcpStream::connect(authority).expect("connect");
    let request = format!("GET {path} HTTP/1.1\r\nHost: {authority}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).expect("write request");

    let mut raw = String::new();
    stream.read_to_string(&mut raw).expect("read response");

    let mut parts = raw.splitn(2, "\r\n\r\n");
    let head = parts.next().unwrap_or_default();
    let body = parts.next().unwrap_or_default().to_string();
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .unwrap_or(0);
    (status, body)
}

pub trait OutputExt {
    fn ok(&self) -> &Self;
    fn stdout_string(&self) -> String;
    fn stderr_string(&self) -> String;
}

impl OutputExt for Output {
    fn ok(&self) -> &Self {
        assert!(
            self.status.success(),
            "expected success, got {:?}\nstdout: {}\nstderr: {}",
            self.status.code(),
            String::from_utf8_lossy(&self.stdout),
            String::from_utf8_lossy(&self.stderr)
        );
        self
    }

    fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}
