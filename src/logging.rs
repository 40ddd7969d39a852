// src/logging.rs

//! `tracing` subscriber shared by both binaries.
//!
//! The level comes from `--log-level`, else `TIMEBOX_LOG`, else the
//! binary's own default. Output always goes to stderr: the supervised child
//! shares our stdout, and `timebox-steps` prints its progress lines there.

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Consulted when `--log-level` is absent.
pub const LOG_ENV_VAR: &str = "TIMEBOX_LOG";

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(cli_level: Option<LogLevel>, default: Level) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let level = resolve_level(cli_level, env_value.as_deref(), default);

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

/// An unrecognised environment value falls back to `default`.
pub fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>, default: Level) -> Level {
    match cli_level {
        Some(lvl) => lvl.into(),
        None => env_value
            .and_then(|v| v.trim().parse::<Level>().ok())
            .unwrap_or(default),
    }
}
