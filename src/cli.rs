// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::parse_duration;
use crate::types::AbortSignal;

/// Command-line arguments for `timebox`.
///
/// Everything from the first positional argument on is the child's command
/// line and is passed through untouched, including arguments that look like
/// flags.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "timebox",
    version,
    about = "Run a command for a bounded time, then abort and reap it.",
    long_about = None
)]
pub struct CliArgs {
    /// Optional TOML file with a `[supervisor]` section.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of polls before the child is aborted (default 3).
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub grace_iterations: Option<u32>,

    /// Time between polls, e.g. `1s` or `250ms` (default 1s).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub poll_interval: Option<Duration>,

    /// Signal sent when the grace period runs out (default ABRT).
    #[arg(long, value_name = "SIGNAL", value_parser = parse_signal)]
    pub abort_signal: Option<AbortSignal>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TIMEBOX_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// The command to supervise, followed by its arguments.
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

/// Command-line arguments for `timebox-steps`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "timebox-steps",
    version,
    about = "Run the [[step]] list from a config file and report each step.",
    long_about = None
)]
pub struct StepsArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Timebox.toml` in the current working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn parse_signal(s: &str) -> Result<AbortSignal, String> {
    s.parse()
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
