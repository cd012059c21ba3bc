// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the process/connection table and the HTTP wire.

pub mod conn_scanner;
pub mod http_classifier;
pub mod tracked_process;

pub use conn_scanner::{ConnScanner, ConnScannerError, ConnSnapshot, Connection, ProcConnScanner, Protocol};
pub use http_classifier::{ClassifierSnapshot, HttpClassifier, NoopWireEventSource, WireEvent, WireEventSource};
pub use tracked_process::{scan_tracked_pids, TrackedProcessPattern};

#[cfg(any(test, feature = "test-support"))]
pub use conn_scanner::FakeConnScanner;
#[cfg(any(test, feature = "test-support"))]
pub use http_classifier::FakeWireEventSource;
