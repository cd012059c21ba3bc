// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SessionContext: the input a hook call carries about where it fired from.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Context a shell hook attaches to every call into the daemon.
///
/// Not persisted directly — it is validated, then folded into `SessionFSM::observe`
/// and (for `session/start`) echoed back in the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub terminal_pid: u32,
    pub shell_pid: u32,
    pub working_dir: PathBuf,
    pub project_path: PathBuf,
    pub user_id: String,
    pub timestamp: i64,
}

/// Window around "now" a hook's timestamp must fall within.
const MAX_PAST_SECS: i64 = 24 * 60 * 60;
const MAX_FUTURE_SECS: i64 = 60 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionContextError {
    #[error("working_dir must be an absolute path, got {0}")]
    WorkingDirNotAbsolute(String),
    #[error("project_path must be an absolute path, got {0}")]
    ProjectPathNotAbsolute(String),
    #[error("user_id must not be empty")]
    EmptyUserId,
    #[error("timestamp {timestamp} is outside the valid window [{min}, {max}]")]
    TimestampOutOfRange { timestamp: i64, min: i64, max: i64 },
}

impl SessionContext {
    /// Validate against §3's field requirements, given the current wall-clock time.
    pub fn validate(&self, now: i64) -> Result<(), SessionContextError> {
        if !self.working_dir.is_absolute() {
            return Err(SessionContextError::WorkingDirNotAbsolute(
                self.working_dir.display().to_string(),
            ));
        }
        if !self.project_path.is_absolute() {
            return Err(SessionContextError::ProjectPathNotAbsolute(
                self.project_path.display().to_string(),
            ));
        }
        if self.user_id.trim().is_empty() {
            return Err(SessionContextError::EmptyUserId);
        }
        let min = now - MAX_PAST_SECS;
        let max = now + MAX_FUTURE_SECS;
        if self.timestamp < min || self.timestamp > max {
            return Err(SessionContextError::TimestampOutOfRange {
                timestamp: self.timestamp,
                min,
                max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_context_tests.rs"]
mod tests;
