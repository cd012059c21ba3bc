use super::*;
use cctrack_core::FakeClock;
use std::fs;
use tempfile::TempDir;

/// `127.0.0.1:80` in little-endian hex, per `/proc/net/tcp` convention.
const LOCAL_127_80: &str = "0100007F:0050";
/// `93.184.216.34:443` (example.com) in little-endian hex.
const REMOTE_EXAMPLE_443: &str = "22D8B85D:01BB";

fn fake_proc_with_connection(pid: u32, inode: u64) -> TempDir {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("net")).unwrap();
    let line = format!(
        "   0: {LOCAL_127_80} {REMOTE_EXAMPLE_443} 01 00000010:00000020 00:00000000 00000000     0        0 {inode} 1 0000000000000000 100 0 0 10 0"
    );
    fs::write(root.path().join("net/tcp"), format!("sl  local remote st tx:rx\n{line}\n")).unwrap();
    fs::write(root.path().join("net/tcp6"), "sl  local remote st tx:rx\n").unwrap();

    let fd_dir = root.path().join(pid.to_string()).join("fd");
    fs::create_dir_all(&fd_dir).unwrap();
    std::os::unix::fs::symlink(format!("socket:[{inode}]"), fd_dir.join("0")).unwrap();

    root
}

#[tokio::test]
async fn empty_tracked_pids_returns_empty_snapshot() {
    let root = TempDir::new().unwrap();
    let scanner = ProcConnScanner::with_default_ports(root.path().to_path_buf(), Arc::new(FakeClock::new(0)));
    let snap = scanner.snapshot(&[]).await.unwrap();
    assert!(snap.connections.is_empty());
    assert_eq!(snap.bytes_delta, 0);
}

#[tokio::test]
async fn joins_fd_inode_to_established_connection() {
    let root = fake_proc_with_connection(42, 999);
    let scanner = ProcConnScanner::with_default_ports(root.path().to_path_buf(), Arc::new(FakeClock::new(0)));
    let snap = scanner.snapshot(&[42]).await.unwrap();
    assert_eq!(snap.connections.len(), 1);
    let conn = &snap.connections[0];
    assert_eq!(conn.pid, 42);
    assert_eq!(conn.remote_port, 443);
    assert_eq!(conn.protocol, Protocol::Https);
}

#[tokio::test]
async fn untracked_pid_is_filtered_out() {
    let root = fake_proc_with_connection(42, 999);
    let scanner = ProcConnScanner::with_default_ports(root.path().to_path_buf(), Arc::new(FakeClock::new(0)));
    let snap = scanner.snapshot(&[7]).await.unwrap();
    assert!(snap.connections.is_empty());
}

#[tokio::test]
async fn second_snapshot_reports_delta_not_cumulative() {
    let root = fake_proc_with_connection(42, 999);
    let clock = Arc::new(FakeClock::new(0));
    let scanner = ProcConnScanner::with_default_ports(root.path().to_path_buf(), clock.clone());
    let first = scanner.snapshot(&[42]).await.unwrap();
    assert!(first.bytes_delta > 0);
    let second = scanner.snapshot(&[42]).await.unwrap();
    assert_eq!(second.bytes_delta, 0);
}

#[test]
fn parses_loopback_ipv4_address() {
    let (addr, port) = parse_hex_addr(LOCAL_127_80, false).unwrap();
    assert_eq!(addr, IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)));
    assert_eq!(port, 80);
}

#[tokio::test]
async fn a_missing_proc_root_escalates_to_interface_read_failed() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("does-not-exist");
    let scanner = ProcConnScanner::with_default_ports(missing, Arc::new(FakeClock::new(0)));
    let result = scanner.snapshot(&[1]).await;
    assert!(matches!(result, Err(ConnScannerError::InterfaceReadFailed(_))));
}

#[tokio::test]
async fn a_missing_net_tcp_file_escalates_to_interface_read_failed() {
    let root = TempDir::new().unwrap();
    // proc_root exists (so pid enumeration succeeds) but net/tcp does not.
    let scanner = ProcConnScanner::with_default_ports(root.path().to_path_buf(), Arc::new(FakeClock::new(0)));
    let result = scanner.snapshot(&[1]).await;
    assert!(matches!(result, Err(ConnScannerError::InterfaceReadFailed(_))));
}

#[tokio::test]
async fn a_single_pids_unreadable_fd_dir_is_skipped_not_escalated() {
    let root = fake_proc_with_connection(42, 999);
    // A second tracked pid with no /fd directory at all (e.g. exited between scans).
    let scanner = ProcConnScanner::with_default_ports(root.path().to_path_buf(), Arc::new(FakeClock::new(0)));
    let snap = scanner.snapshot(&[42, 7777]).await.unwrap();
    assert_eq!(snap.connections.len(), 1);
}

#[test]
fn non_established_lines_are_skipped() {
    let line = "   0: 0100007F:0050 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 1 1 0 100 0 0 10 0";
    assert!(parse_tcp_line(line, false).is_none());
}
