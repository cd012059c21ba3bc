// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cctrack-report`: read-only CLI over the daemon's admin surface.

use cctrack_cli::client::{DaemonClient, SessionDto, WorkBlockDto, WorkDayDto};
use cctrack_cli::output::{format_duration, format_time_ago, render, OutputFormat};
use cctrack_cli::table::{Column, Table};
use clap::{Parser, Subcommand};

const DEFAULT_DAEMON_URL: &str = "http://127.0.0.1:47620";

#[derive(Parser, Debug)]
#[command(name = "cctrack-report", about = "Query the tracking daemon for sessions, work blocks, and daily rollups")]
struct Args {
    #[arg(long, env = "CLAUDE_DAEMON_URL", default_value = DEFAULT_DAEMON_URL)]
    daemon_url: String,

    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Current session/work-block snapshot.
    Status,
    /// Historical sessions.
    Sessions {
        #[arg(long)]
        since: Option<i64>,
        #[arg(long)]
        until: Option<i64>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Historical work blocks.
    WorkBlocks {
        #[arg(long)]
        session_id: Option<String>,
        #[arg(long)]
        since: Option<i64>,
        #[arg(long)]
        until: Option<i64>,
    },
    /// Daily rollups.
    WorkDays {
        #[arg(long)]
        since: Option<String>,
        #[arg(long)]
        until: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = DaemonClient::new(args.daemon_url.clone());

    match args.command {
        Command::Status => {
            let status = client.status().await?;
            render(args.output, &status, |status| print_status(status))?;
        }
        Command::Sessions { since, until, limit } => {
            let sessions = client.sessions(since, until, limit).await?;
            render(args.output, &sessions, |sessions| print_sessions(sessions))?;
        }
        Command::WorkBlocks { session_id, since, until } => {
            let blocks = client.work_blocks(session_id.as_deref(), since, until).await?;
            render(args.output, &blocks, |blocks| print_work_blocks(blocks))?;
        }
        Command::WorkDays { since, until } => {
            let days = client.work_days(since.as_deref(), until.as_deref()).await?;
            render(args.output, &days, |days| print_work_days(days))?;
        }
    }
    Ok(())
}

fn now() -> i64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}

fn print_status(status: &cctrack_cli::client::StatusDto) {
    match &status.session {
        Some(session) => {
            println!("session:        {}", session.id);
            println!("started:        {} ago", format_time_ago(now(), session.start_time));
            println!("window ends:    {} ago", format_time_ago(now(), session.end_time));
            println!("active:         {}", session.is_active);
        }
        None => println!("session:        (none)"),
    }
    match &status.active_block {
        Some(block) => println!("active block:   {} (started {} ago)", block.id, format_time_ago(now(), block.start_time)),
        None => println!("active block:   (none)"),
    }
    match status.last_real_activity {
        Some(ts) => println!("last activity:  {} ago", format_time_ago(now(), ts)),
        None => println!("last activity:  (never)"),
    }
    println!("daemon uptime:  {}", format_duration(status.uptime_seconds as i64));
}

fn print_sessions(sessions: &[SessionDto]) {
    if sessions.is_empty() {
        println!("no sessions found");
        return;
    }
    let mut table = Table::new(vec![Column::left("SESSION").with_max(12), Column::left("STARTED"), Column::left("STATE")]);
    for session in sessions {
        table.row(vec![
            session.id.clone(),
            format_time_ago(now(), session.start_time),
            if session.is_active { "active".to_string() } else { "finished".to_string() },
        ]);
    }
    table.render(&mut std::io::stdout());
}

fn print_work_blocks(blocks: &[WorkBlockDto]) {
    if blocks.is_empty() {
        println!("no work blocks found");
        return;
    }
    let mut table = Table::new(vec![
        Column::left("BLOCK").with_max(12),
        Column::left("SESSION").with_max(12),
        Column::right("DURATION"),
        Column::left("STATE"),
    ]);
    for block in blocks {
        let duration = block.end_time.unwrap_or(block.last_activity) - block.start_time;
        table.row(vec![
            block.id.clone(),
            block.session_id.clone(),
            format_duration(duration),
            if block.is_active { "active".to_string() } else { "finished".to_string() },
        ]);
    }
    table.render(&mut std::io::stdout());
}

fn print_work_days(days: &[WorkDayDto]) {
    if days.is_empty() {
        println!("no work days found");
        return;
    }
    let mut table = Table::new(vec![
        Column::left("DATE"),
        Column::right("SESSIONS"),
        Column::right("BLOCKS"),
        Column::right("ACTIVE"),
        Column::right("EFFICIENCY"),
    ]);
    for day in days {
        table.row(vec![
            day.date.clone(),
            day.session_count.to_string(),
            day.block_count.to_string(),
            format_duration(day.total_seconds),
            format!("{:.0}%", day.efficiency * 100.0),
        ]);
    }
    table.render(&mut std::io::stdout());
}
