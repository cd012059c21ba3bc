// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WorkDay: a per-calendar-date rollup of session/work-block activity.

use serde::{Deserialize, Serialize};

/// One row per UTC calendar date (`YYYY-MM-DD`) touched by at least one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkDay {
    pub date: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub total_seconds: i64,
    pub session_count: u32,
    pub block_count: u32,
    pub efficiency: f64,
    pub updated_at: i64,
}

impl WorkDay {
    /// `total_seconds / span`, clamped to `[0, 1]`; `0` when the day has no span yet.
    pub fn compute_efficiency(total_seconds: i64, span_seconds: i64) -> f64 {
        if span_seconds <= 0 {
            return 0.0;
        }
        (total_seconds as f64 / span_seconds as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[path = "work_day_tests.rs"]
mod tests;
