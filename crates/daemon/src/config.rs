// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: fixed state-directory layout, a TOML file for overrides,
//! and environment variables for the values that change most often.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:47620";
const DEFAULT_TRACKED_PATTERN: &str = "(?i)claude";
const DEFAULT_RATE_LIMIT_PER_SEC: u32 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine state directory (set CLAUDE_STATE_DIR or HOME)")]
    NoStateDir,
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid listen address {0:?}: {1}")]
    InvalidAddr(String, std::net::AddrParseError),
}

/// Partial configuration as it appears in `config.toml`; every field is optional so
/// the file only needs to mention what it's overriding.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    listen_addr: Option<String>,
    tracked_process_pattern: Option<String>,
    rate_limit_per_sec: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub lock_path: PathBuf,
    pub version_path: PathBuf,
    pub log_dir: PathBuf,
    pub db_path: PathBuf,
    pub listen_addr: SocketAddr,
    pub tracked_process_pattern: String,
    pub rate_limit_per_sec: u32,
}

impl Config {
    /// Loads from `~/.local/state/claude-track/` (or `$XDG_STATE_HOME`/`$CLAUDE_STATE_DIR`),
    /// layering `config.toml` over built-in defaults, then environment variables over that.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = state_dir()?;
        let file = read_file_config(&state_dir.join("config.toml"))?;

        let listen_addr = std::env::var("CLAUDE_LISTEN_ADDR")
            .ok()
            .or(file.listen_addr)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr
            .parse()
            .map_err(|e| ConfigError::InvalidAddr(listen_addr.clone(), e))?;

        let tracked_process_pattern = std::env::var("CLAUDE_TRACKED_PROCESS_PATTERN")
            .ok()
            .or(file.tracked_process_pattern)
            .unwrap_or_else(|| DEFAULT_TRACKED_PATTERN.to_string());

        let rate_limit_per_sec = std::env::var("CLAUDE_RATE_LIMIT_PER_SEC")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(file.rate_limit_per_sec)
            .unwrap_or(DEFAULT_RATE_LIMIT_PER_SEC);

        Ok(Self {
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_dir: state_dir.join("logs"),
            db_path: state_dir.join("sessions.db"),
            listen_addr,
            tracked_process_pattern,
            rate_limit_per_sec,
            state_dir,
        })
    }
}

fn read_file_config(path: &std::path::Path) -> Result<FileConfig, ConfigError> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

/// `CLAUDE_STATE_DIR` > `XDG_STATE_HOME/claude-track` > `~/.local/state/claude-track`.
fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("CLAUDE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("claude-track"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/claude-track"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
