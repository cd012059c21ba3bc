// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ConnScanner: established TCP connections belonging to the tracked process set.

mod proc;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeConnScanner;
pub use proc::ProcConnScanner;

use async_trait::async_trait;
use std::net::IpAddr;
use thiserror::Error;

/// Transport protocol inferred from the remote port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Https,
    Http,
}

/// A single established connection attributed to a tracked pid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub pid: u32,
    pub remote_addr: IpAddr,
    pub remote_port: u16,
    pub protocol: Protocol,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
}

/// Result of one scan: the live connection set plus the byte-count delta
/// against the previous scan.
#[derive(Debug, Clone, Default)]
pub struct ConnSnapshot {
    pub connections: Vec<Connection>,
    pub bytes_delta: u64,
}

#[derive(Debug, Error)]
pub enum ConnScannerError {
    #[error("failed to read interface socket table: {0}")]
    InterfaceReadFailed(String),
}

/// Scans the system's connection table for sockets owned by tracked pids.
#[async_trait]
pub trait ConnScanner: Send + Sync + 'static {
    async fn snapshot(&self, tracked_pids: &[u32]) -> Result<ConnSnapshot, ConnScannerError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
