// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::AbortSignal;

/// Configuration file as read from TOML, before validation.
///
/// ```toml
/// [supervisor]
/// grace_iterations = 3
/// poll_interval = "1s"
/// abort_signal = "ABRT"
///
/// [[step]]
/// label = "Mounting kernel source"
/// cmd = ["mount", "-t", "nfs", "host:/src", "/usr/src"]
/// mounted = "/usr/src"
/// ```
///
/// All sections are optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub supervisor: RawSupervisorSection,

    /// Setup steps from `[[step]]`, in file order.
    #[serde(default)]
    pub step: Vec<StepConfig>,
}

/// `[supervisor]` section. Unset keys fall back to [`SupervisorConfig::default`].
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSupervisorSection {
    /// Number of polls before escalating to the abort signal.
    #[serde(default)]
    pub grace_iterations: Option<u32>,

    /// Duration string (e.g. `"1s"`, `"250ms"`) between polls.
    #[serde(default)]
    pub poll_interval: Option<String>,

    #[serde(default)]
    pub abort_signal: Option<AbortSignal>,
}

/// One `[[step]]` entry for the setup harness.
#[derive(Debug, Clone, Deserialize)]
pub struct StepConfig {
    /// Human-readable label printed before the step runs.
    pub label: String,

    /// Command to run, as an argv list.
    pub cmd: Vec<String>,

    /// Skip the step if this path is already a mount point.
    #[serde(default)]
    pub mounted: Option<String>,

    /// Skip the step if this command exits successfully.
    #[serde(default)]
    pub unless: Option<Vec<String>>,
}

/// Validated supervision policy.
///
/// The grace period is `poll_interval * grace_iterations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    pub grace_iterations: u32,
    pub poll_interval: Duration,
    pub abort_signal: AbortSignal,
}

impl SupervisorConfig {
    pub fn grace_period(&self) -> Duration {
        self.poll_interval * self.grace_iterations
    }

    /// Apply per-invocation overrides (e.g. from CLI flags) on top of this
    /// config. `None` keeps the current value.
    pub fn with_overrides(
        mut self,
        grace_iterations: Option<u32>,
        poll_interval: Option<Duration>,
        abort_signal: Option<AbortSignal>,
    ) -> Self {
        if let Some(n) = grace_iterations {
            self.grace_iterations = n;
        }
        if let Some(d) = poll_interval {
            self.poll_interval = d;
        }
        if let Some(sig) = abort_signal {
            self.abort_signal = sig;
        }
        self
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            grace_iterations: 3,
            poll_interval: Duration::from_secs(1),
            abort_signal: AbortSignal::Abrt,
        }
    }
}

/// Validated configuration file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub supervisor: SupervisorConfig,
    pub steps: Vec<StepConfig>,
}

impl ConfigFile {
    /// Construct without validation. Only `validate.rs` should call this.
    pub(crate) fn new_unchecked(supervisor: SupervisorConfig, steps: Vec<StepConfig>) -> Self {
        Self { supervisor, steps }
    }
}
