// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Default transport when nothing is configured. Never yields an event, and never blocks
//! the classifier's tick loop waiting for one.

use super::{WireEvent, WireEventSource};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWireEventSource;

#[async_trait]
impl WireEventSource for NoopWireEventSource {
    async fn recv(&self) -> Option<WireEvent> {
        None
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
