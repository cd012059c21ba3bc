// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text-vs-JSON output selection, shared by every report CLI subcommand.

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render `value` as pretty JSON, or hand it to `render_text` for the table view.
pub fn render<T: Serialize>(format: OutputFormat, value: &T, render_text: impl FnOnce(&T)) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => render_text(value),
    }
    Ok(())
}

/// Format a Unix timestamp (seconds) as relative-to-now (`"5s"`, `"2m"`, `"1h"`, `"3d"`).
pub fn format_time_ago(now: i64, ts: i64) -> String {
    let elapsed = (now - ts).max(0);
    if elapsed < 60 {
        format!("{elapsed}s")
    } else if elapsed < 3600 {
        format!("{}m", elapsed / 60)
    } else if elapsed < 86_400 {
        format!("{}h", elapsed / 3600)
    } else {
        format!("{}d", elapsed / 86_400)
    }
}

/// Format a duration in seconds as `HH:MM:SS`.
pub fn format_duration(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
