// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared table renderer for the report CLI's text output.
//!
//! Provides consistent column alignment and truncation across `sessions`,
//! `work-blocks`, and `work-days` listings.

use std::io::Write;

/// Column text alignment.
pub enum Align {
    Left,
    Right,
}

/// A column definition in a [`Table`].
pub struct Column {
    pub name: &'static str,
    pub align: Align,
    pub max_width: Option<usize>,
}

impl Column {
    pub fn left(name: &'static str) -> Self {
        Self { name, align: Align::Left, max_width: None }
    }

    pub fn right(name: &'static str) -> Self {
        Self { name, align: Align::Right, max_width: None }
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max_width = Some(max);
        self
    }
}

/// A tabular renderer that auto-computes column widths from data.
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

const SEP: &str = "  ";

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Render the full table (header + rows) to the given writer. Does nothing
    /// on an empty table — callers print their own "no results" message instead.
    pub fn render(&self, out: &mut impl Write) {
        if self.rows.is_empty() {
            return;
        }

        let widths = self.compute_widths();
        let last = self.columns.len().saturating_sub(1);

        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| cell(col.name, widths[i], &col.align, i == last))
            .collect();
        let _ = writeln!(out, "{}", header.join(SEP));

        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let raw = row.get(i).map(String::as_str).unwrap_or("");
                    let truncated = truncate(raw, col.max_width);
                    cell(truncated, widths[i], &col.align, i == last)
                })
                .collect();
            let _ = writeln!(out, "{}", cells.join(SEP));
        }
    }

    fn compute_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let data_max = self
                    .rows
                    .iter()
                    .map(|row| {
                        let len = row.get(i).map(String::len).unwrap_or(0);
                        match col.max_width {
                            Some(max) => len.min(max),
                            None => len,
                        }
                    })
                    .max()
                    .unwrap_or(0);
                col.name.len().max(data_max)
            })
            .collect()
    }
}

fn cell(text: &str, width: usize, align: &Align, is_last: bool) -> String {
    if is_last && matches!(align, Align::Left) {
        return text.to_string();
    }
    match align {
        Align::Left => format!("{text:<width$}"),
        Align::Right => format!("{text:>width$}"),
    }
}

fn truncate(s: &str, max: Option<usize>) -> &str {
    match max {
        Some(m) if s.len() > m => &s[..m],
        _ => s,
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
