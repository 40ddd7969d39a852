// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod steps;
pub mod supervisor;
pub mod types;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::cli::{CliArgs, StepsArgs};
use crate::config::validate::validate_supervisor_config;
use crate::config::{SupervisorConfig, default_config_path, load_and_validate};
use crate::errors::SupervisorError;
use crate::exec::{ChildHandle, Interrupt, launch, spawn_interrupt_listener};
use crate::steps::{ProbeCache, run_steps, steps_from_config};
use crate::supervisor::{Outcome, Supervisor, report};
use crate::types::CommandLine;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution (defaults, optional TOML file, CLI flags)
/// - interrupt handling (Ctrl-C / SIGTERM)
/// - launching and supervising the child
///
/// Returns the exit code the supervisor process should terminate with.
pub async fn run(args: CliArgs) -> Result<i32> {
    let config = resolve_config(&args)?;
    let command = CommandLine::try_from(args.command.clone())?;
    debug!(?config, %command, "resolved supervisor settings");

    // Handlers go in before the child exists so no interrupt is lost.
    let mut interrupts = spawn_interrupt_listener().context("installing interrupt handlers")?;

    match supervise(&command, &config, &mut interrupts).await {
        Ok((pid, outcome)) => {
            report(&outcome, pid);
            Ok(outcome.exit_code())
        }
        Err(err @ SupervisorError::LaunchError { .. }) => {
            error!(error = %err, "launch failed");
            eprintln!("timebox: {err}");
            Ok(err.exit_code())
        }
        Err(err) => Err(err.into()),
    }
}

/// Launch `command` and supervise it to completion.
///
/// Returns the child's pid alongside the outcome. Launch failures are
/// returned before any waiting or signalling happens.
pub async fn supervise(
    command: &CommandLine,
    config: &SupervisorConfig,
    interrupts: &mut mpsc::Receiver<Interrupt>,
) -> errors::Result<(u32, Outcome)> {
    let child = launch(command)?;
    let pid = child.pid();
    let outcome = Supervisor::new(config, child).run(interrupts).await?;
    Ok((pid, outcome))
}

/// Defaults, then the `[supervisor]` section of `--config`, then CLI flags.
pub fn resolve_config(args: &CliArgs) -> errors::Result<SupervisorConfig> {
    let base = match &args.config {
        Some(path) => load_and_validate(path)?.supervisor,
        None => SupervisorConfig::default(),
    };

    let config = base.with_overrides(args.grace_iterations, args.poll_interval, args.abort_signal);
    validate_supervisor_config(&config)?;
    Ok(config)
}

/// Entry point for `timebox-steps`.
///
/// Returns `0` when every step succeeded or was skipped, `1` otherwise.
pub async fn run_setup_steps(args: StepsArgs) -> Result<i32> {
    let path = args.config.clone().unwrap_or_else(default_config_path);
    let cfg = load_and_validate(&path)
        .with_context(|| format!("loading steps from {}", path.display()))?;

    let steps = steps_from_config(&cfg.steps)?;
    let mut probes = ProbeCache::new();
    let reports = run_steps(&steps, &mut probes).await;

    let failed = reports.iter().filter(|r| !r.succeeded()).count();
    debug!(total = reports.len(), failed, "setup steps complete");
    Ok(if failed == 0 { 0 } else { 1 })
}
