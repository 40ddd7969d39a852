// src/steps/action.rs

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::StepConfig;
use crate::errors::Result;
use crate::types::CommandLine;

use super::StepResult;
use super::probe::ProbeCache;

/// One named setup action.
pub trait SetupAction: Send + Sync + Debug {
    fn label(&self) -> &str;

    /// `Some(message)` when the action's effect is already in place and the
    /// action should be skipped.
    fn already_satisfied<'a>(
        &'a self,
        probes: &'a mut ProbeCache,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;

    fn run(&self) -> Pin<Box<dyn Future<Output = StepResult> + Send + '_>>;
}

/// A setup action that runs an external command.
#[derive(Debug, Clone)]
pub struct CommandStep {
    label: String,
    cmd: CommandLine,
    mounted: Option<String>,
    unless: Option<CommandLine>,
}

impl CommandStep {
    pub fn new(label: impl Into<String>, cmd: CommandLine) -> Self {
        Self {
            label: label.into(),
            cmd,
            mounted: None,
            unless: None,
        }
    }

    /// Skip the step when `path` is already mounted.
    pub fn skip_if_mounted(mut self, path: impl Into<String>) -> Self {
        self.mounted = Some(path.into());
        self
    }

    /// Skip the step when `check` exits successfully.
    pub fn unless(mut self, check: CommandLine) -> Self {
        self.unless = Some(check);
        self
    }
}

impl TryFrom<&StepConfig> for CommandStep {
    type Error = crate::errors::SupervisorError;

    fn try_from(cfg: &StepConfig) -> std::result::Result<Self, Self::Error> {
        let mut step = CommandStep::new(cfg.label.clone(), CommandLine::try_from(cfg.cmd.clone())?);
        if let Some(path) = &cfg.mounted {
            step = step.skip_if_mounted(path.clone());
        }
        if let Some(check) = &cfg.unless {
            step = step.unless(CommandLine::try_from(check.clone())?);
        }
        Ok(step)
    }
}

/// Build the actions described by `[[step]]` entries, in order.
pub fn steps_from_config(steps: &[StepConfig]) -> Result<Vec<Box<dyn SetupAction>>> {
    steps
        .iter()
        .map(|cfg| CommandStep::try_from(cfg).map(|s| Box::new(s) as Box<dyn SetupAction>))
        .collect()
}

impl SetupAction for CommandStep {
    fn label(&self) -> &str {
        &self.label
    }

    fn already_satisfied<'a>(
        &'a self,
        probes: &'a mut ProbeCache,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(path) = &self.mounted {
                match probes.is_mounted(path).await {
                    Ok(true) => return Some(format!("{path} already mounted.")),
                    Ok(false) => {}
                    Err(e) => warn!(step = %self.label, error = %e, "mount check failed; running step"),
                }
            }

            if let Some(check) = &self.unless {
                if run_quiet(check).await.success {
                    return Some(format!("`{check}` succeeded; nothing to do."));
                }
            }

            None
        })
    }

    fn run(&self) -> Pin<Box<dyn Future<Output = StepResult> + Send + '_>> {
        Box::pin(async move {
            let result = run_quiet(&self.cmd).await;
            if result.success {
                result
            } else {
                StepResult::failed(format!("{} failed: {}", self.label, result.message))
            }
        })
    }
}

/// Run `cmd` to completion with captured output.
async fn run_quiet(cmd: &CommandLine) -> StepResult {
    debug!(cmd = %cmd, "running step command");

    let output = Command::new(&cmd.program)
        .args(&cmd.args)
        .stdin(Stdio::null())
        .output()
        .await;

    match output {
        Ok(out) if out.status.success() => StepResult::ok(),
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let detail = stderr.trim();
            if detail.is_empty() {
                StepResult::failed(format!("`{cmd}` exited with {}", out.status))
            } else {
                StepResult::failed(format!("`{cmd}` exited with {}: {detail}", out.status))
            }
        }
        Err(e) => StepResult::failed(format!("could not start `{}`: {e}", cmd.program)),
    }
}
