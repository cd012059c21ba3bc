// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded relational store: `sessions`, `work_blocks`, `work_days`.
//!
//! Every write is `INSERT OR REPLACE` by primary key, so a retried upsert after a
//! transient failure repairs the row rather than erroring.

use crate::error::StoreError;
use crate::schema::SCHEMA;
use cctrack_core::{Session, SessionId, WorkBlock, WorkBlockId, WorkDay};
use chrono::{NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)
            .map_err(|source| StoreError::Open { path: path.display().to_string(), source })?;
        Self::from_connection(conn)
    }

    /// An ephemeral in-process database, used by tests and by `--no-persist` runs.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn upsert_session(&self, session: &Session, now: i64) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO sessions (session_id, start_time, end_time, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![session.id.as_str(), session.start_time, session.end_time, session.is_active, now],
        )?;
        Ok(())
    }

    pub fn upsert_work_block(&self, block: &WorkBlock, now: i64) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO work_blocks
                (block_id, session_id, start_time, end_time, duration_seconds, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                block.id.as_str(),
                block.session_id.as_str(),
                block.start_time,
                block.end_time,
                block.duration_secs(),
                block.is_active,
                now,
            ],
        )?;
        Ok(())
    }

    pub fn upsert_work_day(&self, day: &WorkDay) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO work_days
                (date, start_time, end_time, total_seconds, session_count, block_count, efficiency, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                day.date,
                day.start_time,
                day.end_time,
                day.total_seconds,
                day.session_count,
                day.block_count,
                day.efficiency,
                day.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_session(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        self.conn
            .lock()
            .query_row(
                "SELECT session_id, start_time, end_time, is_active FROM sessions WHERE session_id = ?1",
                params![id.as_str()],
                row_to_session,
            )
            .optional()
            .map_err(StoreError::from)
    }

    pub fn list_sessions(
        &self,
        since: Option<i64>,
        until: Option<i64>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Session>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT session_id, start_time, end_time, is_active FROM sessions
             WHERE (?1 IS NULL OR start_time >= ?1) AND (?2 IS NULL OR start_time <= ?2)
             ORDER BY start_time DESC LIMIT ?3 OFFSET ?4",
        )?;
        let rows = stmt
            .query_map(params![since, until, limit, offset], row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_work_blocks(
        &self,
        session_id: Option<&str>,
        since: Option<i64>,
        until: Option<i64>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<WorkBlock>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT block_id, session_id, start_time, end_time, is_active, duration_seconds FROM work_blocks
             WHERE (?1 IS NULL OR session_id = ?1)
               AND (?2 IS NULL OR start_time >= ?2)
               AND (?3 IS NULL OR start_time <= ?3)
             ORDER BY start_time DESC LIMIT ?4 OFFSET ?5",
        )?;
        let rows = stmt
            .query_map(params![session_id, since, until, limit, offset], row_to_block)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_work_days(&self, since: Option<&str>, until: Option<&str>) -> Result<Vec<WorkDay>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT date, start_time, end_time, total_seconds, session_count, block_count, efficiency, updated_at
             FROM work_days
             WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date <= ?2)
             ORDER BY date DESC",
        )?;
        let rows = stmt.query_map(params![since, until], row_to_work_day)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Fully recompute `work_days` from `sessions` + `work_blocks`. Idempotent.
    pub fn rebuild_work_days(&self, now: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let mut sessions_stmt = conn.prepare("SELECT session_id, start_time, end_time, is_active FROM sessions")?;
        let sessions =
            sessions_stmt.query_map([], row_to_session)?.collect::<Result<Vec<_>, _>>()?;
        let mut blocks_stmt = conn.prepare("SELECT block_id, start_time, duration_seconds FROM work_blocks")?;
        let blocks = blocks_stmt
            .query_map([], |row| {
                Ok(BlockDurationRow { id: row.get(0)?, start_time: row.get(1)?, duration_seconds: row.get(2)? })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let days = rebuild_work_day_rows(&sessions, &blocks, now);
        for day in &days {
            conn.execute(
                "INSERT OR REPLACE INTO work_days
                    (date, start_time, end_time, total_seconds, session_count, block_count, efficiency, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    day.date,
                    day.start_time,
                    day.end_time,
                    day.total_seconds,
                    day.session_count,
                    day.block_count,
                    day.efficiency,
                    day.updated_at,
                ],
            )?;
        }
        Ok(())
    }
}

fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<Session> {
    Ok(Session {
        id: SessionId::new(row.get::<_, String>(0)?),
        start_time: row.get(1)?,
        end_time: row.get(2)?,
        is_active: row.get(3)?,
    })
}

fn row_to_block(row: &rusqlite::Row) -> rusqlite::Result<WorkBlock> {
    let start_time: i64 = row.get(2)?;
    let end_time: Option<i64> = row.get(3)?;
    let duration_seconds: i64 = row.get(5)?;
    Ok(WorkBlock {
        id: WorkBlockId::new(row.get::<_, String>(0)?),
        session_id: SessionId::new(row.get::<_, String>(1)?),
        start_time,
        last_activity: end_time.unwrap_or(start_time + duration_seconds),
        end_time,
        is_active: row.get(4)?,
    })
}

fn row_to_work_day(row: &rusqlite::Row) -> rusqlite::Result<WorkDay> {
    Ok(WorkDay {
        date: row.get(0)?,
        start_time: row.get(1)?,
        end_time: row.get(2)?,
        total_seconds: row.get(3)?,
        session_count: row.get(4)?,
        block_count: row.get(5)?,
        efficiency: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn date_for(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0).single().unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap()).format("%Y-%m-%d").to_string()
}

fn day_bounds(date: &str) -> (i64, i64) {
    let Ok(naive) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
        return (0, 0);
    };
    let start = Utc.from_utc_datetime(&naive.and_hms_opt(0, 0, 0).expect("midnight is valid"));
    let end = start + chrono::Duration::days(1);
    (start.timestamp(), end.timestamp())
}

struct BlockDurationRow {
    id: String,
    start_time: i64,
    duration_seconds: i64,
}

struct DayAccum {
    start_time: Option<i64>,
    end_time: Option<i64>,
    open_ended: bool,
    total_seconds: i64,
    span_seconds: i64,
    sessions: HashSet<String>,
    blocks: HashSet<String>,
}

impl DayAccum {
    fn new() -> Self {
        Self {
            start_time: None,
            end_time: None,
            open_ended: false,
            total_seconds: 0,
            span_seconds: 0,
            sessions: HashSet::new(),
            blocks: HashSet::new(),
        }
    }
}

fn rebuild_work_day_rows(sessions: &[Session], blocks: &[BlockDurationRow], now: i64) -> Vec<WorkDay> {
    let mut days: HashMap<String, DayAccum> = HashMap::new();

    for session in sessions {
        for date in dates_overlapping(session.start_time, session.end_time) {
            let (day_start, day_end) = day_bounds(&date);
            let entry = days.entry(date).or_insert_with(DayAccum::new);
            entry.sessions.insert(session.id.as_str().to_string());
            entry.start_time = Some(entry.start_time.map_or(session.start_time, |s| s.min(session.start_time)));
            let overlap_start = session.start_time.max(day_start);
            let overlap_end = session.end_time.min(day_end);
            entry.span_seconds += (overlap_end - overlap_start).max(0);
            if session.end_time >= day_end {
                entry.open_ended = true;
            } else {
                entry.end_time = Some(entry.end_time.map_or(session.end_time, |e| e.max(session.end_time)));
            }
        }
    }

    for block in blocks {
        let date = date_for(block.start_time);
        let entry = days.entry(date).or_insert_with(DayAccum::new);
        entry.blocks.insert(block.id.clone());
        entry.total_seconds += block.duration_seconds;
    }

    let mut rows: Vec<WorkDay> = days
        .into_iter()
        .map(|(date, accum)| WorkDay {
            date,
            start_time: accum.start_time.unwrap_or(0),
            end_time: if accum.open_ended { None } else { accum.end_time },
            total_seconds: accum.total_seconds,
            session_count: accum.sessions.len() as u32,
            block_count: accum.blocks.len() as u32,
            efficiency: WorkDay::compute_efficiency(accum.total_seconds, accum.span_seconds),
            updated_at: now,
        })
        .collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date));
    rows
}

fn dates_overlapping(start_time: i64, end_time: i64) -> Vec<String> {
    let mut dates = vec![date_for(start_time)];
    let last = date_for(end_time);
    if dates[0] != last {
        dates.push(last);
    }
    dates
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
