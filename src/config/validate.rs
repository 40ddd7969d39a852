// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{
    ConfigFile, RawConfigFile, RawSupervisorSection, StepConfig, SupervisorConfig,
};
use crate::errors::{Result, SupervisorError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SupervisorError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let supervisor = validate_supervisor_section(&raw.supervisor)?;
        validate_steps(&raw.step)?;
        Ok(ConfigFile::new_unchecked(supervisor, raw.step))
    }
}

fn validate_supervisor_section(raw: &RawSupervisorSection) -> Result<SupervisorConfig> {
    let defaults = SupervisorConfig::default();

    let poll_interval = match raw.poll_interval.as_deref() {
        Some(s) => parse_duration(s).map_err(|e| {
            SupervisorError::ConfigError(format!("[supervisor].poll_interval: {e}"))
        })?,
        None => defaults.poll_interval,
    };

    let config = defaults.with_overrides(raw.grace_iterations, Some(poll_interval), raw.abort_signal);
    validate_supervisor_config(&config)?;
    Ok(config)
}

/// Check the ranges of a (possibly CLI-overridden) supervision policy.
pub fn validate_supervisor_config(config: &SupervisorConfig) -> Result<()> {
    if config.grace_iterations == 0 {
        return Err(SupervisorError::ConfigError(
            "[supervisor].grace_iterations must be >= 1 (got 0)".to_string(),
        ));
    }
    if config.poll_interval == Duration::ZERO {
        return Err(SupervisorError::ConfigError(
            "[supervisor].poll_interval must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_steps(steps: &[StepConfig]) -> Result<()> {
    for (idx, step) in steps.iter().enumerate() {
        if step.label.trim().is_empty() {
            return Err(SupervisorError::ConfigError(format!(
                "step #{} has an empty label",
                idx + 1
            )));
        }
        if step.cmd.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(SupervisorError::ConfigError(format!(
                "step '{}' must have a non-empty `cmd`",
                step.label
            )));
        }
        if let Some(unless) = &step.unless {
            if unless.first().is_none_or(|program| program.trim().is_empty()) {
                return Err(SupervisorError::ConfigError(format!(
                    "step '{}' has an empty `unless` command",
                    step.label
                )));
            }
        }
        if let Some(path) = &step.mounted {
            if path.trim().is_empty() {
                return Err(SupervisorError::ConfigError(format!(
                    "step '{}' has an empty `mounted` path",
                    step.label
                )));
            }
        }
    }
    Ok(())
}
