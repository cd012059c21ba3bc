// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Enumeration of "tracked" processes: the ones whose command line matches the
//! configured assistant-CLI pattern (default: the substring `claude`, case-insensitive).

use regex::Regex;
use std::fs;
use std::path::Path;

/// Pattern used to recognize a tracked process from its `comm`/`cmdline`.
#[derive(Debug, Clone)]
pub struct TrackedProcessPattern(Regex);

impl TrackedProcessPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("(?i){pattern}")).map(Self)
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }
}

impl Default for TrackedProcessPattern {
    fn default() -> Self {
        Self::new("claude").expect("default pattern is always valid")
    }
}

/// Scan `/proc` for every numeric pid whose `comm` or `cmdline` matches `pattern`.
///
/// A pid that disappears mid-scan (read fails with `NotFound` or similar) is skipped,
/// not treated as an error — the same failure policy as the socket table join.
pub fn scan_tracked_pids(proc_root: &Path, pattern: &TrackedProcessPattern) -> Vec<u32> {
    let Ok(entries) = fs::read_dir(proc_root) else {
        return Vec::new();
    };

    entries
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
        .filter(|pid| process_matches(proc_root, *pid, pattern))
        .collect()
}

fn process_matches(proc_root: &Path, pid: u32, pattern: &TrackedProcessPattern) -> bool {
    let dir = proc_root.join(pid.to_string());

    if let Ok(comm) = fs::read_to_string(dir.join("comm")) {
        if pattern.is_match(comm.trim()) {
            return true;
        }
    }

    if let Ok(cmdline) = fs::read_to_string(dir.join("cmdline")) {
        let joined = cmdline.replace('\0', " ");
        if pattern.is_match(joined.trim()) {
            return true;
        }
    }

    false
}

#[cfg(test)]
#[path = "tracked_process_tests.rs"]
mod tests;
