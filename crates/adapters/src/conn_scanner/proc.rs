// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Linux `/proc`-backed `ConnScanner`.
//!
//! Joins `/proc/<pid>/fd/*` socket inodes against `/proc/net/tcp`(+`tcp6`) to recover
//! which established connections belong to which tracked pid, then filters to the
//! configured HTTP port set.

use super::{Connection, ConnScanner, ConnScannerError, ConnSnapshot, Protocol};
use async_trait::async_trait;
use cctrack_core::Clock;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;
use std::sync::Arc;

const STALE_AFTER_SECS: i64 = 10 * 60;
const TCP_ESTABLISHED: &str = "01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ConnKey {
    pid: u32,
    local_port: u16,
    remote_addr: IpAddr,
    remote_port: u16,
}

struct Tracked {
    last_seen: i64,
    bytes: u64,
}

pub struct ProcConnScanner {
    proc_root: PathBuf,
    http_ports: HashSet<u16>,
    clock: Arc<dyn Clock>,
    seen: Mutex<HashMap<ConnKey, Tracked>>,
    prev_total_bytes: Mutex<u64>,
}

impl ProcConnScanner {
    pub fn new(proc_root: PathBuf, http_ports: HashSet<u16>, clock: Arc<dyn Clock>) -> Self {
        Self {
            proc_root,
            http_ports,
            clock,
            seen: Mutex::new(HashMap::new()),
            prev_total_bytes: Mutex::new(0),
        }
    }

    pub fn with_default_ports(proc_root: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self::new(proc_root, [80, 443, 8080, 8443].into_iter().collect(), clock)
    }

    /// Walks `<proc_root>/<pid>/fd/*` to map socket inodes to owning pids. A failure to
    /// enumerate `proc_root` itself is a whole-interface failure and escalates; a failure
    /// to read one pid's `fd` directory (exited process, permission) is skipped silently.
    fn socket_inode_to_pid(&self) -> Result<HashMap<u64, u32>, ConnScannerError> {
        let mut map = HashMap::new();
        let pids = fs::read_dir(&self.proc_root)
            .map_err(|e| ConnScannerError::InterfaceReadFailed(format!("{}: {e}", self.proc_root.display())))?;
        for entry in pids.filter_map(Result::ok) {
            let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
                continue;
            };
            let fd_dir = entry.path().join("fd");
            let Ok(fds) = fs::read_dir(&fd_dir) else {
                continue;
            };
            for fd in fds.filter_map(Result::ok) {
                let Ok(target) = fs::read_link(fd.path()) else {
                    continue;
                };
                if let Some(inode) = parse_socket_inode(&target.to_string_lossy()) {
                    map.insert(inode, pid);
                }
            }
        }
        Ok(map)
    }

    /// Evicts tracked-connection entries not observed within the staleness window. Runs
    /// on its own schedule from the supervisor's conn-table-cleanup monitor, independent
    /// of whether `snapshot` is being driven by tick activity.
    pub fn evict_stale(&self, now: i64) {
        self.seen.lock().retain(|_, t| now - t.last_seen <= STALE_AFTER_SECS);
    }

    fn read_table(&self, file: &str, v6: bool) -> Result<Vec<(u64, u16, IpAddr, u16, u64, u64)>, ConnScannerError> {
        let path = self.proc_root.join(file);
        let contents = fs::read_to_string(&path)
            .map_err(|e| ConnScannerError::InterfaceReadFailed(format!("{}: {e}", path.display())))?;
        Ok(contents.lines().skip(1).filter_map(|line| parse_tcp_line(line, v6)).collect())
    }
}

#[async_trait]
impl ConnScanner for ProcConnScanner {
    async fn snapshot(&self, tracked_pids: &[u32]) -> Result<ConnSnapshot, ConnScannerError> {
        let tracked: HashSet<u32> = tracked_pids.iter().copied().collect();
        if tracked.is_empty() {
            return Ok(ConnSnapshot::default());
        }

        let inode_to_pid = self.socket_inode_to_pid()?;
        let mut rows = self.read_table("net/tcp", false)?;
        rows.extend(self.read_table("net/tcp6", true)?);

        let mut by_key: HashMap<ConnKey, Connection> = HashMap::new();
        for (inode, local_port, remote_addr, remote_port, tx, rx) in rows {
            let Some(&pid) = inode_to_pid.get(&inode) else {
                continue;
            };
            if !tracked.contains(&pid) || !self.http_ports.contains(&remote_port) {
                continue;
            }
            let protocol = if matches!(remote_port, 443 | 8443) {
                Protocol::Https
            } else {
                Protocol::Http
            };
            let key = ConnKey { pid, local_port, remote_addr, remote_port };
            by_key.insert(
                key,
                Connection { pid, remote_addr, remote_port, protocol, tx_bytes: tx, rx_bytes: rx },
            );
        }

        let now = self.clock.now();
        let mut total_bytes = 0u64;
        let mut seen = self.seen.lock();
        for (key, conn) in &by_key {
            let bytes = conn.tx_bytes + conn.rx_bytes;
            total_bytes += bytes;
            seen.insert(*key, Tracked { last_seen: now, bytes });
        }
        seen.retain(|_, t| now - t.last_seen <= STALE_AFTER_SECS);

        let mut prev = self.prev_total_bytes.lock();
        let bytes_delta = total_bytes.saturating_sub(*prev);
        *prev = total_bytes;

        Ok(ConnSnapshot { connections: by_key.into_values().collect(), bytes_delta })
    }
}

fn parse_socket_inode(link_target: &str) -> Option<u64> {
    link_target.strip_prefix("socket:[")?.strip_suffix(']')?.parse().ok()
}

/// Parses one data line of `/proc/net/tcp`(`6`), returning
/// `(inode, local_port, remote_addr, remote_port, tx_queue, rx_queue)` for established
/// connections only.
fn parse_tcp_line(line: &str, v6: bool) -> Option<(u64, u16, IpAddr, u16, u64, u64)> {
    let mut fields = line.split_whitespace();
    let _sl = fields.next()?;
    let local = fields.next()?;
    let remote = fields.next()?;
    let state = fields.next()?;
    if state != TCP_ESTABLISHED {
        return None;
    }
    let queues = fields.next()?;
    let _tr = fields.next()?;
    let _retr = fields.next()?;
    let _uid = fields.next()?;
    let _timeout = fields.next()?;
    let inode: u64 = fields.next()?.parse().ok()?;

    let (_, local_port) = parse_hex_addr(local, v6)?;
    let (remote_addr, remote_port) = parse_hex_addr(remote, v6)?;
    let (tx, rx) = queues.split_once(':').and_then(|(tx, rx)| {
        Some((u64::from_str_radix(tx, 16).ok()?, u64::from_str_radix(rx, 16).ok()?))
    })?;

    Some((inode, local_port, remote_addr, remote_port, tx, rx))
}

fn parse_hex_addr(field: &str, v6: bool) -> Option<(IpAddr, u16)> {
    let (addr_hex, port_hex) = field.split_once(':')?;
    let port = u16::from_str_radix(port_hex, 16).ok()?;
    let addr = if v6 {
        // Printed as four 32-bit words in host (little-endian) byte order.
        if addr_hex.len() != 32 {
            return None;
        }
        let mut bytes = [0u8; 16];
        for (i, chunk) in addr_hex.as_bytes().chunks(8).enumerate() {
            let word = u32::from_str_radix(std::str::from_utf8(chunk).ok()?, 16).ok()?;
            bytes[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
        }
        IpAddr::V6(Ipv6Addr::from(bytes))
    } else {
        let raw = u32::from_str_radix(addr_hex, 16).ok()?;
        IpAddr::V4(Ipv4Addr::from(raw.to_le_bytes()))
    };
    Some((addr, port))
}

#[cfg(test)]
#[path = "proc_tests.rs"]
mod tests;
