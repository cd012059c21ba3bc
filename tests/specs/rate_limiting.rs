//! Token-bucket rate limiting on the HTTP surface.

use crate::prelude::*;

#[test]
fn exceeding_the_per_second_budget_yields_429_with_rate_limit_headers() {
    let state_dir = tempfile::tempdir().expect("tempdir");
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr")
    };

    let mut child = std::process::Command::new(daemon_binary())
        .env("CLAUDE_STATE_DIR", state_dir.path())
        .env("CLAUDE_LISTEN_ADDR", addr.to_string())
        .env("CLAUDE_RATE_LIMIT_PER_SEC", "2")
        .env("RUST_LOG", "warn")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .expect("spawn cctrackd");

    let url = format!("http://{addr}");
    let became_ready = wait_for(SPEC_WAIT_MAX_MS, || http_get(&url, "/health").0 != 0);
    assert!(became_ready, "daemon did not start");

    let mut saw_429 = false;
    for _ in 0..50 {
        let (status, _) = http_get(&url, "/health");
        if status == 429 {
            saw_429 = true;
            break;
        }
    }
    assert!(saw_429, "expected at least one 429 once the token bucket is exhausted");

    let _ = child.kill();
    let _ = child.wait();
}
