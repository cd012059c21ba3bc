// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the embedded store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database at {path}: {source}")]
    Open { path: String, #[source] source: rusqlite::Error },
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("row data is malformed: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Every failure mode in this crate is a filesystem/SQLite hiccup — the `transient_io`
    /// error kind from the taxonomy. Callers log-and-count rather than propagate.
    pub fn is_transient(&self) -> bool {
        true
    }
}
