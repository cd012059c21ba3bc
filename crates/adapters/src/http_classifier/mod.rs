// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTPClassifier: per-tick HTTP method accounting fed by a pluggable wire-event source.

mod classifier;
mod noop;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeWireEventSource;

pub use classifier::{ClassifierSnapshot, HttpClassifier};
pub use noop::NoopWireEventSource;

use async_trait::async_trait;
use cctrack_core::HttpMethod;

/// One observed HTTP request on the wire.
#[derive(Debug, Clone)]
pub struct WireEvent {
    pub ts: i64,
    pub pid: u32,
    pub method: HttpMethod,
    pub host: String,
    pub uri: String,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// Pluggable transport boundary: whatever proxy, eBPF probe, or packet-capture parser is
/// configured feeds events in; the classifier never parses wire bytes itself.
#[async_trait]
pub trait WireEventSource: Send + Sync + 'static {
    /// Pull the next observed event, or `None` if the source is closed/unconfigured.
    async fn recv(&self) -> Option<WireEvent>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
